//! Project code allocation.
//!
//! [`allocate_code`] derives a unique project code from the caller's
//! fragments. It runs against a [`CodeLedger`], which is an open storage
//! transaction: the same transaction must later insert the project row, so
//! that the final uniqueness check and the insert commit together.
//!
//! Normal projects draw their sequence from a per-year counter that never
//! hands out the same value twice, even after rows are deleted. Annual
//! projects use the reserved `"00"` sequence and are limited to one per
//! `(year, business unit, client/department, category)`.

use std::fmt;

use async_trait::async_trait;

use crate::project_code::{phase_type, validate_fragment, ProjectCode, ProjectType, Sequence};

/// Caller-supplied attributes for a new project code.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    pub business_unit: String,
    pub client_or_dept: String,
    pub category: String,
    pub project_type: Option<ProjectType>,
    pub is_annual: bool,
}

impl AllocationRequest {
    /// Reject empty or malformed fragments before any storage is touched.
    pub fn validate(&self) -> Result<(), String> {
        validate_fragment("business_unit_code", &self.business_unit)?;
        validate_fragment("client_or_dept_code", &self.client_or_dept)?;
        validate_fragment("project_category", &self.category)?;
        Ok(())
    }
}

/// The dimension tuple under which at most one annual project may exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnualKey {
    pub year_suffix: String,
    pub business_unit: String,
    pub client_or_dept: String,
    pub category: String,
}

impl fmt::Display for AnnualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "year {} / {} / {} / {}",
            self.year_suffix, self.business_unit, self.client_or_dept, self.category
        )
    }
}

/// Why an allocation did not produce a code.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError<E>
where
    E: std::error::Error + 'static,
{
    /// A required fragment was missing or malformed. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An annual project already exists for the tuple. The caller must
    /// remove it before creating another.
    #[error("An annual project already exists for {key}")]
    DuplicateAnnual { key: AnnualKey },

    /// The candidate code was taken between the sequence read and the
    /// insert. Transient; the caller should retry.
    #[error("Project code {code} is already taken; retry the request")]
    Collision { code: String },

    #[error(transparent)]
    Storage(E),
}

/// Storage operations the allocator needs, scoped to one open transaction.
#[async_trait]
pub trait CodeLedger: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Two-digit year suffix from the storage server's clock.
    async fn year_suffix(&mut self) -> Result<String, Self::Error>;

    /// Number of annual projects already registered under `key`.
    async fn count_annual(&mut self, key: &AnnualKey) -> Result<i64, Self::Error>;

    /// Reserve and return the next normal sequence number for the year.
    ///
    /// Must be strictly greater than every normal sequence previously
    /// handed out or observed for that year.
    async fn next_sequence(&mut self, year_suffix: &str) -> Result<u32, Self::Error>;

    /// Whether a project with this exact code exists.
    async fn code_exists(&mut self, code: &str) -> Result<bool, Self::Error>;
}

/// Allocate a project code for `request` within `ledger`'s transaction.
pub async fn allocate_code<L>(
    ledger: &mut L,
    request: &AllocationRequest,
) -> Result<ProjectCode, AllocationError<L::Error>>
where
    L: CodeLedger + ?Sized,
{
    request.validate().map_err(AllocationError::Validation)?;

    let year_suffix = ledger
        .year_suffix()
        .await
        .map_err(AllocationError::Storage)?;

    let sequence = if request.is_annual {
        let key = AnnualKey {
            year_suffix: year_suffix.clone(),
            business_unit: request.business_unit.clone(),
            client_or_dept: request.client_or_dept.clone(),
            category: request.category.clone(),
        };
        let existing = ledger
            .count_annual(&key)
            .await
            .map_err(AllocationError::Storage)?;
        if existing > 0 {
            tracing::info!(%key, "Rejected duplicate annual project");
            return Err(AllocationError::DuplicateAnnual { key });
        }
        Sequence::Annual
    } else {
        let n = ledger
            .next_sequence(&year_suffix)
            .await
            .map_err(AllocationError::Storage)?;
        Sequence::Numbered(n)
    };

    let code = ProjectCode {
        business_unit: request.business_unit.clone(),
        category: request.category.clone(),
        client_or_dept: request.client_or_dept.clone(),
        year_suffix,
        sequence,
        phase_type: phase_type(request.project_type),
    };

    let candidate = code.to_string();
    if ledger
        .code_exists(&candidate)
        .await
        .map_err(AllocationError::Storage)?
    {
        tracing::warn!(code = %candidate, "Project code collision detected before insert");
        return Err(AllocationError::Collision { code: candidate });
    }

    tracing::debug!(code = %candidate, "Allocated project code");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;

    use assert_matches::assert_matches;

    use super::*;

    /// In-memory ledger holding committed codes and per-year counters.
    #[derive(Default)]
    struct MemoryLedger {
        year: String,
        codes: Vec<ProjectCode>,
        sequences: HashMap<String, u32>,
    }

    impl MemoryLedger {
        fn in_year(year: &str) -> Self {
            Self {
                year: year.to_string(),
                ..Self::default()
            }
        }

        /// Allocate and "insert" in one step, like the repository does.
        async fn create(
            &mut self,
            request: &AllocationRequest,
        ) -> Result<ProjectCode, AllocationError<Infallible>> {
            let code = allocate_code(self, request).await?;
            self.codes.push(code.clone());
            Ok(code)
        }

        fn delete(&mut self, code: &str) {
            self.codes.retain(|c| c.to_string() != code);
        }
    }

    #[async_trait]
    impl CodeLedger for MemoryLedger {
        type Error = Infallible;

        async fn year_suffix(&mut self) -> Result<String, Infallible> {
            Ok(self.year.clone())
        }

        async fn count_annual(&mut self, key: &AnnualKey) -> Result<i64, Infallible> {
            Ok(self
                .codes
                .iter()
                .filter(|c| {
                    c.sequence.is_annual()
                        && c.year_suffix == key.year_suffix
                        && c.business_unit == key.business_unit
                        && c.client_or_dept == key.client_or_dept
                        && c.category == key.category
                })
                .count() as i64)
        }

        async fn next_sequence(&mut self, year_suffix: &str) -> Result<u32, Infallible> {
            let observed = self
                .codes
                .iter()
                .filter(|c| c.year_suffix == year_suffix)
                .filter_map(|c| match c.sequence {
                    Sequence::Numbered(n) => Some(n),
                    Sequence::Annual => None,
                })
                .max()
                .unwrap_or(0);
            let last = self.sequences.entry(year_suffix.to_string()).or_insert(0);
            *last = (*last).max(observed) + 1;
            Ok(*last)
        }

        async fn code_exists(&mut self, code: &str) -> Result<bool, Infallible> {
            Ok(self.codes.iter().any(|c| c.to_string() == code))
        }
    }

    fn request(project_type: ProjectType, is_annual: bool) -> AllocationRequest {
        AllocationRequest {
            business_unit: "BU1".into(),
            client_or_dept: "C1".into(),
            category: "D".into(),
            project_type: Some(project_type),
            is_annual,
        }
    }

    #[tokio::test]
    async fn first_normal_projects_of_the_year() {
        let mut ledger = MemoryLedger::in_year("25");
        let req = request(ProjectType::Internal, false);

        let first = ledger.create(&req).await.unwrap();
        let second = ledger.create(&req).await.unwrap();

        assert_eq!(first.to_string(), "BU1-D-C1-2501-T");
        assert_eq!(second.to_string(), "BU1-D-C1-2502-T");
    }

    #[tokio::test]
    async fn annual_project_is_a_singleton() {
        let mut ledger = MemoryLedger::in_year("25");
        let req = request(ProjectType::Internal, true);

        let first = ledger.create(&req).await.unwrap();
        assert_eq!(first.to_string(), "BU1-D-C1-2500-T");

        let before = ledger.codes.len();
        let err = ledger.create(&req).await.unwrap_err();
        assert_matches!(err, AllocationError::DuplicateAnnual { ref key } if key.year_suffix == "25");
        assert_eq!(ledger.codes.len(), before, "no row may be added");

        // A different project type under the same tuple is still a duplicate.
        let other_type = request(ProjectType::ExternalProject, true);
        assert_matches!(
            ledger.create(&other_type).await,
            Err(AllocationError::DuplicateAnnual { .. })
        );
    }

    #[tokio::test]
    async fn annual_project_allowed_again_after_removal() {
        let mut ledger = MemoryLedger::in_year("25");
        let req = request(ProjectType::Internal, true);

        let first = ledger.create(&req).await.unwrap();
        ledger.delete(&first.to_string());

        let again = ledger.create(&req).await.unwrap();
        assert_eq!(again.to_string(), "BU1-D-C1-2500-T");
    }

    #[tokio::test]
    async fn annual_tuples_are_independent() {
        let mut ledger = MemoryLedger::in_year("25");
        ledger.create(&request(ProjectType::Internal, true)).await.unwrap();

        let mut other_client = request(ProjectType::Internal, true);
        other_client.client_or_dept = "C2".into();
        assert!(ledger.create(&other_client).await.is_ok());

        let mut other_year = MemoryLedger::in_year("26");
        other_year.codes = ledger.codes.clone();
        assert!(other_year
            .create(&request(ProjectType::Internal, true))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn annual_projects_do_not_consume_the_sequence() {
        let mut ledger = MemoryLedger::in_year("25");
        ledger.create(&request(ProjectType::Internal, true)).await.unwrap();
        let normal = ledger.create(&request(ProjectType::Internal, false)).await.unwrap();
        assert_eq!(normal.sequence, Sequence::Numbered(1));
    }

    #[tokio::test]
    async fn sequence_is_global_per_year_and_strictly_increasing() {
        let mut ledger = MemoryLedger::in_year("25");
        let mut last = 0;
        for (i, bu) in ["BU1", "BU2", "BU3", "BU1", "BU9"].iter().enumerate() {
            let mut req = request(ProjectType::ExternalDelivery, false);
            req.business_unit = (*bu).to_string();
            let code = ledger.create(&req).await.unwrap();
            let Sequence::Numbered(n) = code.sequence else {
                panic!("normal allocation must be numbered");
            };
            assert!(n > last, "allocation {i} did not increase: {n} <= {last}");
            last = n;
        }
        assert_eq!(last, 5);
    }

    #[tokio::test]
    async fn deleted_codes_are_not_reused() {
        let mut ledger = MemoryLedger::in_year("25");
        let req = request(ProjectType::Internal, false);
        ledger.create(&req).await.unwrap();
        let second = ledger.create(&req).await.unwrap();
        ledger.delete(&second.to_string());

        let third = ledger.create(&req).await.unwrap();
        assert_eq!(third.to_string(), "BU1-D-C1-2503-T");
    }

    #[tokio::test]
    async fn collision_is_reported_for_retry() {
        let mut ledger = MemoryLedger::in_year("25");
        // Another writer committed 2501 after this transaction read its
        // sequence value.
        ledger.codes.push("BU1-D-C1-2501-T".parse().unwrap());

        struct StaleLedger<'a>(&'a mut MemoryLedger);

        #[async_trait]
        impl<'a> CodeLedger for StaleLedger<'a> {
            type Error = Infallible;
            async fn year_suffix(&mut self) -> Result<String, Infallible> {
                self.0.year_suffix().await
            }
            async fn count_annual(&mut self, key: &AnnualKey) -> Result<i64, Infallible> {
                self.0.count_annual(key).await
            }
            async fn next_sequence(&mut self, _year: &str) -> Result<u32, Infallible> {
                // Simulates a count read that raced with the other insert.
                Ok(1)
            }
            async fn code_exists(&mut self, code: &str) -> Result<bool, Infallible> {
                self.0.code_exists(code).await
            }
        }

        let before = ledger.codes.len();
        let mut stale = StaleLedger(&mut ledger);
        let result = allocate_code(&mut stale, &request(ProjectType::Internal, false)).await;
        assert_matches!(result, Err(AllocationError::Collision { ref code }) if code == "BU1-D-C1-2501-T");
        assert_eq!(ledger.codes.len(), before);
    }

    #[tokio::test]
    async fn empty_fragment_is_rejected_before_storage() {
        struct UnreachableLedger;

        #[async_trait]
        impl CodeLedger for UnreachableLedger {
            type Error = Infallible;
            async fn year_suffix(&mut self) -> Result<String, Infallible> {
                panic!("storage must not be touched")
            }
            async fn count_annual(&mut self, _: &AnnualKey) -> Result<i64, Infallible> {
                panic!("storage must not be touched")
            }
            async fn next_sequence(&mut self, _: &str) -> Result<u32, Infallible> {
                panic!("storage must not be touched")
            }
            async fn code_exists(&mut self, _: &str) -> Result<bool, Infallible> {
                panic!("storage must not be touched")
            }
        }

        let mut req = request(ProjectType::Internal, false);
        req.client_or_dept = String::new();
        let result = allocate_code(&mut UnreachableLedger, &req).await;
        assert_matches!(result, Err(AllocationError::Validation(msg)) if msg.contains("client_or_dept_code"));
    }

    #[tokio::test]
    async fn missing_type_defaults_phase_to_delivery() {
        let mut ledger = MemoryLedger::in_year("25");
        let mut req = request(ProjectType::Internal, false);
        req.project_type = None;
        let code = ledger.create(&req).await.unwrap();
        assert_eq!(code.to_string(), "BU1-D-C1-2501-D");
    }

    #[tokio::test]
    async fn allocated_code_round_trips_through_parse() {
        let mut ledger = MemoryLedger::in_year("25");
        let req = request(ProjectType::ExternalOther, false);
        let code = ledger.create(&req).await.unwrap();
        let parsed: ProjectCode = code.to_string().parse().unwrap();
        assert_eq!(parsed.business_unit, req.business_unit);
        assert_eq!(parsed.category, req.category);
        assert_eq!(parsed.client_or_dept, req.client_or_dept);
        assert_eq!(parsed.year_suffix, "25");
        assert_eq!(parsed.sequence, Sequence::Numbered(1));
        assert_eq!(parsed.phase_type, 'O');
    }
}
