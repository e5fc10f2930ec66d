mod balance;
mod calculator;
mod expense;
mod money;
mod participant;
mod split;
mod validator;

pub use balance::*;
pub use calculator::*;
pub use expense::*;
pub use money::*;
pub use participant::*;
pub use split::*;
pub use validator::*;
