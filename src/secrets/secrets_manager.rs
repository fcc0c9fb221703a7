use anyhow::{Context, Result};
use serde::Deserialize;

pub const PASSWORD_ENV: &str = "ADI_DB_PASSWORD";

#[derive(Deserialize, Debug, Default)]
struct Secrets {
    password: Option<String>,
}

/// Resolves the document store password. The environment wins over the file.
pub struct SecretsManager {
    secrets_file_name: Option<String>,
}

impl SecretsManager {
    pub fn new(secrets_file_name: Option<&str>) -> Self {
        Self {
            secrets_file_name: secrets_file_name.map(str::to_string),
        }
    }

    pub async fn password(&self) -> Result<Option<String>> {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            return Ok(Some(password));
        }
        let Some(secrets_file_name) = &self.secrets_file_name else {
            return Ok(None);
        };

        let content = tokio::fs::read_to_string(secrets_file_name)
            .await
            .with_context(|| format!("Failed to read secrets file: {secrets_file_name}"))?;
        let secrets: Option<Secrets> = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to deserialize secrets file: {secrets_file_name}"))?;
        Ok(secrets.and_then(|s| s.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_password_from_file() {
        if std::env::var(PASSWORD_ENV).is_ok() {
            return;
        }
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "password: hunter2").unwrap();
        let manager = SecretsManager::new(file.path().to_str());
        assert_eq!(manager.password().await.unwrap().as_deref(), Some("hunter2"));
    }

    #[tokio::test]
    async fn no_file_means_no_password() {
        if std::env::var(PASSWORD_ENV).is_ok() {
            return;
        }
        assert_eq!(SecretsManager::new(None).password().await.unwrap(), None);
    }
}
