//! Business card contacts from CSV exports into `graph_entities`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{ImportError, ImportResult};
use crate::models::{ContactImportSummary, ContactPayload};
use crate::traits::SsotRepository;

/// CSV header to payload key
pub const HEADER_MAP: &[(&str, &str)] = &[
    ("会社名", "company_name"),
    ("部署名", "department"),
    ("役職", "title"),
    ("氏名", "name"),
    ("e-mail", "email"),
    ("郵便番号", "postal_code"),
    ("住所", "address"),
    ("TEL会社", "tel_company"),
    ("TEL直通", "tel_direct"),
    ("携帯電話", "mobile"),
    ("Fax", "fax"),
    ("URL", "url"),
    ("スキャン日", "scanned_at"),
    ("名刺交換日", "exchanged_at"),
    ("備考", "notes"),
];

/// Exports from Eight start with this many metadata lines before the header
pub const EIGHT_METADATA_LINES: usize = 3;

/// Number of contacts listed in a dry run
const DRY_RUN_PREVIEW: usize = 5;

const CONTACT_ID_PREFIX: &str = "cnt_";

/// `eight` for Eight exports, `scanned` for everything else
pub fn source_type(file_name: &str) -> &'static str {
    if file_name.contains("eight") {
        "eight"
    } else {
        "scanned"
    }
}

/// New time-ordered contact id
pub fn generate_contact_id() -> String {
    format!("{CONTACT_ID_PREFIX}{}", Uuid::now_v7().simple())
}

fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = rest.get(pos.saturating_add(1)..).unwrap_or_default(),
            None => return "",
        }
    }
    rest
}

/// Parse CSV text into contact payloads
///
/// A leading BOM is ignored. Rows that are entirely empty or have no name
/// are dropped, as are empty values.
///
/// # Errors
///
/// Returns `csv::Error` on malformed CSV
pub fn parse_contacts(text: &str, source_file: &str) -> Result<Vec<ContactPayload>, csv::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let skip = if source_type(source_file) == "eight" {
        EIGHT_METADATA_LINES
    } else {
        0
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(skip_lines(text, skip).as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<(usize, &str)> = HEADER_MAP
        .iter()
        .filter_map(|(header, key)| {
            headers
                .iter()
                .position(|h| h.trim() == *header)
                .map(|idx| (idx, *key))
        })
        .collect();

    let mut contacts = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let mut fields = BTreeMap::new();
        for (idx, key) in &columns {
            if let Some(value) = record.get(*idx).map(str::trim).filter(|v| !v.is_empty()) {
                fields.insert((*key).to_string(), value.to_string());
            }
        }
        if !fields.contains_key("name") {
            continue;
        }
        fields.insert("source_file".to_string(), source_file.to_string());
        fields.insert(
            "source_type".to_string(),
            source_type(source_file).to_string(),
        );
        contacts.push(ContactPayload(fields));
    }

    Ok(contacts)
}

/// Read one contacts CSV file
///
/// # Errors
///
/// Returns `ImportError::Io` or `ImportError::Csv`
pub fn read_contacts_file(path: &Path) -> ImportResult<Vec<ContactPayload>> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_contacts(&text, &file_name).map_err(|source| ImportError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Every `*.csv` in `dir`, sorted by name
///
/// # Errors
///
/// Returns `ImportError::FileNotFound` if `dir` does not exist
pub fn discover_contact_files(dir: &Path) -> ImportResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ImportError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|source| ImportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    files.sort();
    Ok(files)
}

/// Read every file, skipping missing ones with a warning
///
/// # Errors
///
/// Returns the first read or parse error of an existing file
pub fn load_contacts(files: &[PathBuf]) -> ImportResult<Vec<ContactPayload>> {
    let mut contacts = Vec::new();
    for path in files {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Skipping contacts file (not found)");
            continue;
        }
        let parsed = read_contacts_file(path)?;
        tracing::info!(path = %path.display(), contacts = parsed.len(), "Read contacts file");
        contacts.extend(parsed);
    }
    Ok(contacts)
}

/// Log what an import would insert without touching the database
pub fn preview_contacts(contacts: &[ContactPayload]) -> ContactImportSummary {
    tracing::info!(contacts = contacts.len(), "[DRY RUN] Would insert contacts");
    for contact in contacts.iter().take(DRY_RUN_PREVIEW) {
        tracing::info!("  {}", contact.label());
    }
    if contacts.len() > DRY_RUN_PREVIEW {
        tracing::info!(
            "  ... and {} more",
            contacts.len().saturating_sub(DRY_RUN_PREVIEW)
        );
    }
    ContactImportSummary {
        total: contacts.len(),
        ..ContactImportSummary::default()
    }
}

/// Insert contacts one by one; a failed row counts as skipped
pub async fn import_contacts<R>(
    repo: &R,
    contacts: &[ContactPayload],
    dry_run: bool,
) -> ContactImportSummary
where
    R: SsotRepository + ?Sized,
{
    if dry_run {
        return preview_contacts(contacts);
    }

    let mut summary = ContactImportSummary {
        total: contacts.len(),
        ..ContactImportSummary::default()
    };

    for contact in contacts {
        let id = generate_contact_id();
        match repo.insert_contact(&id, contact).await {
            Ok(true) => summary.inserted = summary.inserted.saturating_add(1),
            Ok(false) => summary.skipped = summary.skipped.saturating_add(1),
            Err(e) => {
                tracing::warn!(
                    name = contact.name().unwrap_or_default(),
                    error = %e,
                    "Failed to insert contact"
                );
                summary.skipped = summary.skipped.saturating_add(1);
            }
        }
    }

    tracing::info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        total = summary.total,
        "Contact import complete"
    );
    summary
}
