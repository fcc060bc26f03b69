//! The five node kinds and the runtime they share.
//!
//! | Node      | Module        | Radio           | Button            |
//! |-----------|---------------|-----------------|-------------------|
//! | central   | [`central`]   | broadcast + unicast | click commands |
//! | gate      | [`satellite`] | broadcast + unicast | none           |
//! | door      | [`satellite`] | broadcast + unicast | garden lights  |
//! | kitchen   | [`kitchen`]   | unicast only    | jump / confirm    |
//! | bathroom  | [`bathroom`]  | none            | shower            |

pub mod bathroom;
pub mod central;
pub mod click;
pub mod helpers;
pub mod kitchen;
pub mod satellite;
pub mod station;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;
