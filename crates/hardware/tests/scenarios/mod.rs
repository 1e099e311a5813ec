//! End-to-end scenarios driven through the public `Simulator` API.

mod octonyte_icache;
mod pipenyte_stall;
mod tetranyte_barrel;
mod tohost_protocol;
mod traps;
