use std::fmt::Debug;

use phonenumber::country;

#[derive(Debug, Clone)]
pub struct PhoneNumberDomain(pub String);

impl PhoneNumberDomain {
    pub fn parse(number: String) -> Result<PhoneNumberDomain, String> {
        let number = number.trim().to_string();
        match phonenumber::parse(Some(country::PH), &number) {
            Ok(parsed) if phonenumber::is_valid(&parsed) => Ok(Self(
                parsed.format().mode(phonenumber::Mode::E164).to_string(),
            )),
            _ => Err(format!("{} is not a valid phone number", number)),
        }
    }

    pub fn inner(&self) -> String {
        self.0.clone()
    }
}

impl std::fmt::Display for PhoneNumberDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

// Parses an optional phone number, treating blank input as absent.
pub fn parse_optional_phone(number: Option<String>) -> Result<Option<String>, String> {
    match number {
        Some(n) if !n.trim().is_empty() => Ok(Some(PhoneNumberDomain::parse(n)?.inner())),
        _ => Ok(None),
    }
}
