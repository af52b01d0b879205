use crate::entities::workflow_document::{DocumentStatus, WorkflowKind};
use crate::errors::ServiceError;

/// Terminal transition requested through the `action` field of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Approve,
    Reject,
}

impl WorkflowAction {
    /// Parses the client-supplied action. Inventories also accept their own
    /// vocabulary: `finish` approves and `cancel` rejects.
    pub fn parse(kind: WorkflowKind, raw: &str) -> Result<Self, ServiceError> {
        let normalized = raw.trim().to_ascii_lowercase();
        match (kind, normalized.as_str()) {
            (_, "approve") => Ok(WorkflowAction::Approve),
            (_, "reject") => Ok(WorkflowAction::Reject),
            (WorkflowKind::Inventory, "finish") => Ok(WorkflowAction::Approve),
            (WorkflowKind::Inventory, "cancel") => Ok(WorkflowAction::Reject),
            _ => Err(ServiceError::ValidationError(format!(
                "Unknown action '{}' for {}",
                raw, kind
            ))),
        }
    }
}

/// Public `statusId` of an inventory.
pub fn inventory_status_id(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::New => "open",
        DocumentStatus::Approved => "finished",
        DocumentStatus::Rejected => "cancelled",
    }
}

/// Parses the `status` list filter. The stored vocabulary is accepted for
/// every kind; inventories also accept `open`, `finished` and `cancelled`.
pub fn parse_status_filter(kind: WorkflowKind, raw: &str) -> Result<DocumentStatus, ServiceError> {
    let normalized = raw.trim().to_ascii_lowercase();
    match (kind, normalized.as_str()) {
        (_, "new") => Ok(DocumentStatus::New),
        (_, "approved") => Ok(DocumentStatus::Approved),
        (_, "rejected") => Ok(DocumentStatus::Rejected),
        (WorkflowKind::Inventory, "open") => Ok(DocumentStatus::New),
        (WorkflowKind::Inventory, "finished") => Ok(DocumentStatus::Approved),
        (WorkflowKind::Inventory, "cancelled") => Ok(DocumentStatus::Rejected),
        _ => Err(ServiceError::ValidationError(format!(
            "Unknown status '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case(WorkflowKind::Transfer, "approve", WorkflowAction::Approve)]
    #[case(WorkflowKind::WriteOff, " Reject ", WorkflowAction::Reject)]
    #[case(WorkflowKind::Inventory, "finish", WorkflowAction::Approve)]
    #[case(WorkflowKind::Inventory, "cancel", WorkflowAction::Reject)]
    #[case(WorkflowKind::Inventory, "approve", WorkflowAction::Approve)]
    fn parses_actions(
        #[case] kind: WorkflowKind,
        #[case] raw: &str,
        #[case] expected: WorkflowAction,
    ) {
        assert_eq!(WorkflowAction::parse(kind, raw).unwrap(), expected);
    }

    #[rstest]
    #[case(WorkflowKind::Transfer, "finish")]
    #[case(WorkflowKind::Repricing, "cancel")]
    #[case(WorkflowKind::Inventory, "archive")]
    fn rejects_unknown_actions(#[case] kind: WorkflowKind, #[case] raw: &str) {
        assert_matches!(
            WorkflowAction::parse(kind, raw),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn status_filter_accepts_both_inventory_vocabularies() {
        assert_eq!(
            parse_status_filter(WorkflowKind::Inventory, "finished").unwrap(),
            DocumentStatus::Approved
        );
        assert_eq!(
            parse_status_filter(WorkflowKind::Inventory, "APPROVED").unwrap(),
            DocumentStatus::Approved
        );
        assert!(parse_status_filter(WorkflowKind::Transfer, "open").is_err());
        assert_eq!(inventory_status_id(DocumentStatus::Rejected), "cancelled");
    }
}
