use thiserror::Error;

use crate::credentials::CredentialError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Credential(#[from] CredentialError),
}
