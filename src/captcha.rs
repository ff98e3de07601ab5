use rand::Rng;

/// Simple addition challenge shown before checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captcha {
    question: String,
    answer: i32,
}

impl Captcha {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let a = rng.gen_range(1..=10);
        let b = rng.gen_range(1..=10);
        Self::from_operands(a, b)
    }

    pub fn from_operands(a: i32, b: i32) -> Self {
        Self {
            question: format!("{} + {} = ?", a, b),
            answer: a + b,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn verify(&self, input: &str) -> bool {
        input
            .trim()
            .parse::<i32>()
            .is_ok_and(|given| given == self.answer)
    }
}
