use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::menu::{self, MenuItem};
use crate::shipping::Branch;
use crate::utils::geo::Coordinate;
use crate::utils::rupiah::format_rupiah;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MenuItemResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub price_display: String,
}

impl From<&MenuItem> for MenuItemResponse {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            price_display: format_rupiah(item.price),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BranchInfo {
    pub id: String,
    pub name: String,
    pub coordinate: Option<Coordinate>,
    pub rate_per_km: f64,
    pub minimum_fee: f64,
    pub contact_number: String,
}

impl From<&Branch> for BranchInfo {
    fn from(branch: &Branch) -> Self {
        Self {
            id: branch.id.clone(),
            name: branch.display_name.clone(),
            coordinate: branch.coordinate,
            rate_per_km: branch.rate_per_km,
            minimum_fee: branch.minimum_fee,
            contact_number: branch.contact_number.clone(),
        }
    }
}

/// List the drinks on the menu
pub async fn list_menu(State(state): State<AppState>) -> Json<Vec<MenuItemResponse>> {
    Json(state.menu.iter().map(MenuItemResponse::from).collect())
}

/// Get a single menu item
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<MenuItemResponse>> {
    let item = menu::find(&state.menu, &item_id)
        .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;

    Ok(Json(MenuItemResponse::from(item)))
}

/// List all branches
pub async fn list_branches(State(state): State<AppState>) -> Json<Vec<BranchInfo>> {
    Json(state.calculator.branches().iter().map(BranchInfo::from).collect())
}
