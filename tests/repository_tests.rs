//! Repository tests against an in-memory SQLite database.

#[path = "test_utils/mod.rs"]
mod test_utils;

use anyhow::Result;
use tickets::error::RepositoryError;
use tickets::repositories::{CommentRepository, NewComment, TicketFields, TicketRepository};
use test_utils::setup_test_db_arc;

fn fields(title: &str) -> TicketFields {
    TicketFields {
        title: title.to_string(),
        status: "open".to_string(),
        priority: "low".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn ticket_create_backfills_only_empty_numbers() -> Result<()> {
    let repo = TicketRepository::new(setup_test_db_arc().await?);

    let generated = repo.create(fields("Generated")).await?;
    assert_eq!(
        generated.ticket_number,
        Some(format!("TICKET-{}", generated.id))
    );

    let empty = repo
        .create(TicketFields {
            ticket_number: Some(String::new()),
            ..fields("Empty")
        })
        .await?;
    assert_eq!(empty.ticket_number, Some(format!("TICKET-{}", empty.id)));

    let blank = repo
        .create(TicketFields {
            ticket_number: Some("   ".to_string()),
            ..fields("Blank")
        })
        .await?;
    assert_eq!(blank.ticket_number.as_deref(), Some("   "));

    let padded = repo
        .create(TicketFields {
            ticket_number: Some(" OPS-1 ".to_string()),
            ..fields("Padded")
        })
        .await?;
    assert_eq!(padded.ticket_number.as_deref(), Some(" OPS-1 "));

    let supplied = repo
        .create(TicketFields {
            ticket_number: Some("HR-7".to_string()),
            ..fields("Supplied")
        })
        .await?;
    assert_eq!(supplied.ticket_number.as_deref(), Some("HR-7"));

    Ok(())
}

#[tokio::test]
async fn ticket_create_with_duplicate_number_leaves_no_row() -> Result<()> {
    let repo = TicketRepository::new(setup_test_db_arc().await?);

    let number = TicketFields {
        ticket_number: Some("DUP".to_string()),
        ..fields("first")
    };
    repo.create(number.clone()).await?;

    let err = repo.create(number).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Database(_)));
    assert_eq!(repo.list().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn ticket_create_refuses_reserved_number_of_another_row() -> Result<()> {
    let repo = TicketRepository::new(setup_test_db_arc().await?);

    let err = repo
        .create(TicketFields {
            ticket_number: Some("TICKET-2".to_string()),
            ..fields("Squatter")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
    assert!(repo.list().await?.is_empty());

    for title in ["a", "b", "c"] {
        let ticket = repo.create(fields(title)).await?;
        assert_eq!(ticket.ticket_number, Some(format!("TICKET-{}", ticket.id)));
    }

    Ok(())
}

#[tokio::test]
async fn ticket_replace_accepts_own_generated_number_only() -> Result<()> {
    let repo = TicketRepository::new(setup_test_db_arc().await?);
    let first = repo.create(fields("first")).await?;
    let second = repo.create(fields("second")).await?;

    let own = repo
        .replace(
            first.id,
            TicketFields {
                ticket_number: first.ticket_number.clone(),
                ..fields("first, edited")
            },
        )
        .await?;
    assert_eq!(own.current.ticket_number, first.ticket_number);

    let err = repo
        .replace(
            first.id,
            TicketFields {
                ticket_number: Some(format!("TICKET-{}", second.id + 1)),
                ..fields("first")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    let third = repo.create(fields("third")).await?;
    assert_eq!(third.ticket_number, Some(format!("TICKET-{}", third.id)));

    Ok(())
}

#[tokio::test]
async fn ticket_replace_reports_status_change() -> Result<()> {
    let repo = TicketRepository::new(setup_test_db_arc().await?);
    let ticket = repo.create(fields("Flaky CI")).await?;

    let replaced = repo
        .replace(
            ticket.id,
            TicketFields {
                status: "in_progress".to_string(),
                ..fields("Flaky CI")
            },
        )
        .await?;

    assert!(replaced.status_changed());
    assert_eq!(replaced.previous.status, "open");
    assert_eq!(replaced.current.status, "in_progress");
    assert_eq!(replaced.current.ticket_number, None);
    assert_eq!(replaced.current.created_at, ticket.created_at);
    assert!(replaced.current.updated_at >= ticket.updated_at);

    let reverted = repo.replace(ticket.id, fields("Flaky CI")).await?;
    let same = repo.replace(ticket.id, fields("Flaky CI")).await?;
    assert!(reverted.status_changed());
    assert!(!same.status_changed());

    Ok(())
}

#[tokio::test]
async fn ticket_soft_delete_hides_row() -> Result<()> {
    let repo = TicketRepository::new(setup_test_db_arc().await?);
    let ticket = repo.create(fields("Obsolete")).await?;

    assert!(repo.soft_delete(ticket.id).await?);
    assert!(repo.find_by_id(ticket.id).await?.is_none());
    assert!(repo.list().await?.is_empty());
    assert!(!repo.soft_delete(ticket.id).await?);

    let err = repo.replace(ticket.id, fields("Revived")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn comment_update_and_soft_delete() -> Result<()> {
    let repo = CommentRepository::new(setup_test_db_arc().await?);

    let comment = repo
        .create(NewComment {
            ticket_id: 1,
            author: "frank".to_string(),
            text: "typo".to_string(),
        })
        .await?;

    let updated = repo
        .update(comment.id, "frank".to_string(), "fixed".to_string())
        .await?;
    assert_eq!(updated.text, "fixed");
    assert_eq!(updated.created_at, comment.created_at);

    assert!(repo.soft_delete(comment.id).await?);
    assert!(repo.list_by_ticket(1).await?.is_empty());
    assert!(repo.find_by_id(comment.id).await?.is_none());

    let err = repo
        .update(comment.id, "frank".to_string(), "again".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));

    Ok(())
}
