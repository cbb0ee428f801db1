const MAX_SHOP_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone)]
pub struct ShopName(String);

impl ShopName {
    pub fn parse(name: String) -> Result<ShopName, String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err("shop name cannot be empty".to_string());
        }
        if trimmed.chars().count() > MAX_SHOP_NAME_LENGTH {
            return Err(format!(
                "shop name cannot be longer than {} characters",
                MAX_SHOP_NAME_LENGTH
            ));
        }
        if trimmed.chars().any(is_forbidden) {
            return Err(format!("{} contains forbidden characters", trimmed));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ShopName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Branch names, addresses, service names and similar free text fields.
#[derive(Debug, Clone)]
pub struct RequiredText(String);

impl RequiredText {
    pub fn parse(field: &str, value: String, max_length: usize) -> Result<RequiredText, String> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(format!("{} cannot be empty", field));
        }
        if trimmed.chars().count() > max_length {
            return Err(format!(
                "{} cannot be longer than {} characters",
                field, max_length
            ));
        }
        if trimmed.chars().any(is_forbidden) {
            return Err(format!("{} contains forbidden characters", field));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn is_forbidden(c: char) -> bool {
    c.is_control() || matches!(c, '<' | '>' | '{' | '}' | '\\')
}
