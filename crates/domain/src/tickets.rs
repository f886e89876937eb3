//! Operations tickets handed off to warehouse, carrier, billing or support.

use chrono::Utc;
use common::{ParseEnumError, TicketId, TicketPriority, TicketStatus, TicketType};
use ledger_store::{LedgerStore, LedgerStoreExt, Ticket};

use crate::error::{DomainError, Result};

#[derive(Clone)]
pub struct TicketService<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> TicketService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Opens a ticket.
    ///
    /// `ticket_type` and `priority` must be wire names (`warehouse`, `med`,
    /// ...); the type is checked before the priority.
    #[tracing::instrument(skip(self, body))]
    pub async fn create(
        &self,
        ticket_type: &str,
        priority: &str,
        title: &str,
        body: &str,
    ) -> Result<Ticket> {
        let (title, body) = (title.trim(), body.trim());
        if title.is_empty() || body.is_empty() {
            return Err(DomainError::validation("title and body are required"));
        }
        let ticket_type: TicketType = ticket_type.trim().parse().map_err(invalid)?;
        let priority: TicketPriority = priority.trim().parse().map_err(invalid)?;

        let ticket = Ticket {
            id: TicketId::new(),
            ticket_type,
            priority,
            title: title.to_string(),
            body: body.to_string(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
        };
        self.store.insert(ticket.clone()).await?;

        metrics::counter!("tickets_opened_total", "type" => ticket_type.as_str()).increment(1);
        tracing::info!(ticket_id = %ticket.id, %ticket_type, %priority, "Ticket opened");
        Ok(ticket)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, ticket_id: TicketId) -> Result<Ticket> {
        self.store
            .ticket(ticket_id)
            .await?
            .ok_or(DomainError::NotFound("Ticket not found"))
    }
}

fn invalid(err: ParseEnumError) -> DomainError {
    DomainError::validation(err.to_string())
}

#[cfg(test)]
mod tests {
    use ledger_store::InMemoryLedgerStore;

    use super::*;

    fn service() -> TicketService<InMemoryLedgerStore> {
        TicketService::new(InMemoryLedgerStore::new())
    }

    #[tokio::test]
    async fn create_opens_ticket_and_reads_back() {
        let service = service();

        let ticket = service
            .create("warehouse", "high", " Count mismatch ", "HEADSET-Z3 shows 0 on the shelf")
            .await
            .unwrap();
        assert_eq!(ticket.ticket_type, TicketType::Warehouse);
        assert_eq!(ticket.priority, TicketPriority::High);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.title, "Count mismatch");

        assert_eq!(service.get(ticket.id).await.unwrap(), ticket);
    }

    #[tokio::test]
    async fn unknown_type_lists_accepted_values() {
        let err = service()
            .create("legal", "low", "Title", "Body")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type. Must be one of: warehouse, carrier, billing, support"
        );
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn priority_uses_short_medium_name() {
        let service = service();
        let err = service
            .create("billing", "medium", "Title", "Body")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid priority. Must be one of: low, med, high"
        );

        let ticket = service.create("billing", "med", "Title", "Body").await.unwrap();
        assert_eq!(ticket.priority, TicketPriority::Medium);
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_enums() {
        let err = service().create("nope", "nope", "   ", "Body").await.unwrap_err();
        assert_eq!(err.to_string(), "title and body are required");
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn unknown_ticket_is_not_found() {
        assert!(matches!(
            service().get(TicketId::new()).await,
            Err(DomainError::NotFound("Ticket not found"))
        ));
    }
}
