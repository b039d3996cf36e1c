mod otp;

pub use otp::{generate_code, CredentialStore, MemoryCredentialStore, CODE_LENGTH};
