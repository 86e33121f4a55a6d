//! Ticket storage for Seatbook
//!
//! Persistence is a host concern; the core ships an in-memory store and the
//! repository trait other backends implement.

mod memory;
mod traits;

pub use memory::MemoryTicketStore;
pub use traits::TicketRepository;
