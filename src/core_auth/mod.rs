// Module d'authentification pour rouilleshd
// Comptes statiques, vérification des mots de passe et machine à états de connexion

pub mod core_auth;
pub mod helper;
pub mod state_machine;

pub use core_auth::{CredentialStore, Role};
pub use state_machine::{AuthStage, AuthStep};
