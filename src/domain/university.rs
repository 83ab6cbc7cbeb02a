use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct University {
    pub code: String,
    pub name: String,
}

/// Codes are stored upper-case; role tokens carry them in any case.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("hku"), "HKU");
        assert_eq!(normalize_code(" Cu "), "CU");
        assert_eq!(normalize_code("HKUST"), "HKUST");
    }
}
