//! Storage repository traits
//!
//! The reservation core only needs lookup, insert and whole-ticket replace.
//! Hosts can back this with a map, a database, or a remote service.

use uuid::Uuid;

use crate::error::Result;
use crate::models::GroupTicket;

/// Ticket repository operations
pub trait TicketRepository {
    /// Store a newly created ticket
    fn insert_ticket(&mut self, ticket: GroupTicket) -> Result<()>;

    /// Replace a stored ticket with an updated copy
    fn replace_ticket(&mut self, ticket: GroupTicket) -> Result<()>;

    /// Find ticket by ID
    fn find_ticket(&self, id: Uuid) -> Result<Option<GroupTicket>>;

    /// All tickets, most recently created first
    fn list_tickets(&self) -> Result<Vec<GroupTicket>>;

    /// Number of stored tickets
    fn count_tickets(&self) -> Result<usize>;
}
