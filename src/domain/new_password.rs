use secrecy::{ExposeSecret, SecretString};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug)]
pub struct NewPassword(SecretString);

impl NewPassword {
    pub fn parse(password: SecretString) -> Result<NewPassword, String> {
        let length = password.expose_secret().chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(format!(
                "password cannot be longer than {} characters",
                MAX_PASSWORD_LENGTH
            ));
        }
        Ok(Self(password))
    }

    pub fn into_inner(self) -> SecretString {
        self.0
    }
}
