//! Gate de Privilégio
//!
//! No alvo original a transição task → modo privilegiado é uma trap (SVC).
//! Aqui ela é uma seção crítica re-entrante que entrega um token
//! `Privileged` a quem está dentro. Só quem tem o token pode mexer em wait
//! records do scheduler ou disparar uma transferência física.
//!
//! # Módulos
//!
//! - `gate`: `PrivilegeGate` e o token `Privileged`

pub mod gate;

pub use gate::{PrivilegeGate, Privileged};
