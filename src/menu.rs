use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price in Rupiah
    pub price: i64,
}

fn item(id: &str, name: &str, description: &str, price: i64) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
    }
}

pub fn default_menu() -> Vec<MenuItem> {
    vec![
        item(
            "kelapa-muda-original",
            "Es Kelapa Muda Original",
            "Air dan daging kelapa muda segar dengan es batu",
            10000,
        ),
        item(
            "kelapa-muda-susu",
            "Es Kelapa Muda Susu",
            "Kelapa muda dengan susu kental manis",
            13000,
        ),
        item(
            "kelapa-muda-gula-aren",
            "Es Kelapa Muda Gula Aren",
            "Kelapa muda dengan sirup gula aren asli",
            13000,
        ),
        item(
            "kelapa-jeruk",
            "Es Kelapa Jeruk",
            "Kelapa muda dengan perasan jeruk nipis",
            12000,
        ),
        item(
            "kelapa-batok",
            "Kelapa Batok Utuh",
            "Satu buah kelapa muda utuh, langsung dari batok",
            15000,
        ),
        item(
            "kelapa-pandan",
            "Es Kelapa Pandan",
            "Kelapa muda dengan sirup pandan dan selasih",
            14000,
        ),
    ]
}

pub fn find<'a>(menu: &'a [MenuItem], id: &str) -> Option<&'a MenuItem> {
    menu.iter().find(|m| m.id == id)
}
