//! In-memory ticket store

use std::collections::HashMap;

use tracing::instrument;
use uuid::Uuid;

use super::traits::TicketRepository;
use crate::error::{Error, NotFound, Result};
use crate::models::GroupTicket;

/// Authoritative in-process store keyed by ticket id
#[derive(Debug, Default)]
pub struct MemoryTicketStore {
    tickets: HashMap<Uuid, GroupTicket>,
    /// Ids in creation order, oldest first
    order: Vec<Uuid>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TicketRepository for MemoryTicketStore {
    #[instrument(skip(self, ticket), fields(ticket_id = %ticket.id))]
    fn insert_ticket(&mut self, ticket: GroupTicket) -> Result<()> {
        let id = ticket.id;
        if self.tickets.insert(id, ticket).is_none() {
            self.order.push(id);
        } else {
            tracing::warn!("Ticket id reused on insert, previous ticket replaced");
        }
        Ok(())
    }

    #[instrument(skip(self, ticket), fields(ticket_id = %ticket.id))]
    fn replace_ticket(&mut self, ticket: GroupTicket) -> Result<()> {
        match self.tickets.get_mut(&ticket.id) {
            Some(stored) => {
                *stored = ticket;
                Ok(())
            }
            None => Err(Error::NotFound(NotFound::Ticket(ticket.id))),
        }
    }

    fn find_ticket(&self, id: Uuid) -> Result<Option<GroupTicket>> {
        Ok(self.tickets.get(&id).cloned())
    }

    fn list_tickets(&self) -> Result<Vec<GroupTicket>> {
        Ok(self
            .order
            .iter()
            .rev()
            .filter_map(|id| self.tickets.get(id).cloned())
            .collect())
    }

    fn count_tickets(&self) -> Result<usize> {
        Ok(self.tickets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{parse_date, parse_time};
    use crate::models::{HallType, SlotKey, TimeSlot};
    use chrono::Utc;

    fn make_ticket(n: u128) -> GroupTicket {
        let date = parse_date("2025-06-01").unwrap();
        let key = SlotKey::new(date, parse_time("13:00").unwrap(), HallType::B);
        GroupTicket {
            id: Uuid::from_u128(n),
            package_name: "团票".to_string(),
            headcount: 2,
            selected_date: date,
            slots: vec![TimeSlot::with_seats(key, vec!["a".into(), "b".into()])],
            remarks: String::new(),
            remark_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let mut store = MemoryTicketStore::new();
        store.insert_ticket(make_ticket(1)).unwrap();

        let found = store.find_ticket(Uuid::from_u128(1)).unwrap();
        assert!(found.is_some());
        assert!(store.find_ticket(Uuid::from_u128(2)).unwrap().is_none());
        assert_eq!(store.count_tickets().unwrap(), 1);
    }

    #[test]
    fn test_list_newest_first() {
        let mut store = MemoryTicketStore::new();
        for n in 1..=3 {
            store.insert_ticket(make_ticket(n)).unwrap();
        }

        let ids: Vec<Uuid> = store.list_tickets().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(3), Uuid::from_u128(2), Uuid::from_u128(1)]
        );
    }

    #[test]
    fn test_replace_requires_existing() {
        let mut store = MemoryTicketStore::new();
        let result = store.replace_ticket(make_ticket(7));
        assert!(matches!(result, Err(Error::NotFound(NotFound::Ticket(_)))));

        store.insert_ticket(make_ticket(7)).unwrap();
        let mut updated = make_ticket(7);
        updated.remarks = "bring water".to_string();
        store.replace_ticket(updated).unwrap();

        let stored = store.find_ticket(Uuid::from_u128(7)).unwrap().unwrap();
        assert_eq!(stored.remarks, "bring water");
        assert_eq!(store.list_tickets().unwrap().len(), 1);
    }
}
