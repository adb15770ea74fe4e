//! Assertion extraction.
//!
//! Turns one policy object's raw export into validated [`SettingAssertion`]s
//! stamped with the link's metadata. Any problem with an export skips that
//! policy object entirely and yields one [`ExtractionWarning`].
//!
//! Exports can be fetched on a small bounded worker pool; results are always
//! handed back in link order so the index sees the same sequence either way.

use std::collections::HashSet;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::config::CompiledConfig;
use crate::error::{ExtractionWarning, ResolveError, ResolveResult, WarningKind};
use crate::policy::PolicyLink;
use crate::setting::{RawSetting, SettingAssertion, SettingContext};
use crate::source::PolicySource;

/// Outcome of extracting one link.
pub type Extraction = Result<Vec<SettingAssertion>, ExtractionWarning>;

fn require(
    link: &PolicyLink,
    index: usize,
    field: &'static str,
    value: Option<String>,
) -> Result<String, ExtractionWarning> {
    value.ok_or_else(|| {
        ExtractionWarning::new(
            link.policy_id.clone(),
            WarningKind::MissingField {
                index,
                field: field.to_string(),
            },
        )
    })
}

/// Validates a raw export and converts it into assertions.
///
/// Settings outside the configured contexts or key filter are skipped
/// silently. Missing fields, unknown contexts and duplicate identities reject
/// the whole export.
///
/// # Errors
/// Returns the warning describing the first problem found.
pub fn extract_assertions(
    link: &PolicyLink,
    export: Vec<RawSetting>,
    config: &CompiledConfig,
) -> Extraction {
    let mut assertions = Vec::with_capacity(export.len());
    let mut seen = HashSet::with_capacity(export.len());

    for (index, raw) in export.into_iter().enumerate() {
        let context_raw = require(link, index, "context", raw.context)?;
        let context: SettingContext = context_raw.parse().map_err(|_| {
            ExtractionWarning::new(
                link.policy_id.clone(),
                WarningKind::UnknownContext {
                    index,
                    context: context_raw.clone(),
                },
            )
        })?;
        if !config.contexts.contains(context) {
            continue;
        }

        let key_path = require(link, index, "key_path", raw.key_path)?;
        let value_name = require(link, index, "value_name", raw.value_name)?;
        let value = require(link, index, "value", raw.value)?;
        let data_type = raw.data_type.unwrap_or_default();

        if !config.accepts_key(&key_path) {
            continue;
        }

        let assertion =
            SettingAssertion::from_link(link, context, key_path, value_name, data_type, value);
        let identity = assertion.identity(config.identity_folding);
        if !seen.insert(identity.clone()) {
            return Err(ExtractionWarning::new(
                link.policy_id.clone(),
                WarningKind::DuplicateSetting {
                    identity: identity.to_string(),
                },
            ));
        }
        assertions.push(assertion);
    }

    Ok(assertions)
}

/// Fetches one link's export and extracts it.
///
/// # Errors
/// A collaborator failure becomes a `FetchFailed` warning.
pub fn fetch_and_extract(
    source: &dyn PolicySource,
    link: &PolicyLink,
    config: &CompiledConfig,
) -> Extraction {
    let export = source
        .fetch_settings(&link.policy_id, config.contexts)
        .map_err(|e| {
            ExtractionWarning::new(
                link.policy_id.clone(),
                WarningKind::FetchFailed {
                    message: e.to_string(),
                },
            )
        })?;
    extract_assertions(link, export, config)
}

/// Extracts every link, returning one outcome per link in link order.
///
/// Uses `config.extraction_workers` threads when more than one is configured.
///
/// # Errors
/// Returns `Internal` only if the worker pool cannot be started or loses results.
pub fn extract_all(
    source: &dyn PolicySource,
    links: &[PolicyLink],
    config: &CompiledConfig,
) -> ResolveResult<Vec<Extraction>> {
    let workers = config.extraction_workers.min(links.len());
    if workers <= 1 {
        return Ok(links
            .iter()
            .map(|link| fetch_and_extract(source, link, config))
            .collect());
    }

    let (job_tx, job_rx): (Sender<usize>, Receiver<usize>) = bounded(links.len());
    let (out_tx, out_rx): (Sender<(usize, Extraction)>, Receiver<(usize, Extraction)>) =
        bounded(links.len());

    for idx in 0..links.len() {
        job_tx
            .send(idx)
            .map_err(|_| ResolveError::internal("extraction job queue closed"))?;
    }
    drop(job_tx);

    thread::scope(|scope| -> ResolveResult<()> {
        for worker in 0..workers {
            let rx = job_rx.clone();
            let tx = out_tx.clone();
            thread::Builder::new()
                .name(format!("policyscope-extract-{worker}"))
                .spawn_scoped(scope, move || {
                    while let Ok(idx) = rx.recv() {
                        let outcome = fetch_and_extract(source, &links[idx], config);
                        if tx.send((idx, outcome)).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|e| {
                    ResolveError::internal(format!("cannot spawn extraction worker: {e}"))
                })?;
        }
        Ok(())
    })?;
    drop(out_tx);

    let mut slots: Vec<Option<Extraction>> = (0..links.len()).map(|_| None).collect();
    for (idx, outcome) in out_rx.try_iter() {
        slots[idx] = Some(outcome);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.ok_or_else(|| {
                ResolveError::internal(format!("extraction result missing for link #{idx}"))
            })
        })
        .collect()
}
