//! Terminal commands — thin callers over the retrieval service.
//!
//! Each command builds the service from config, runs one operation, and
//! prints a human-readable result. No business logic lives here; this module
//! plays the role the HTTP route handlers play in a deployed system.

use anyhow::Result;
use std::sync::Arc;

use cairn::config::CairnConfig;
use cairn::embedding;
use cairn::knowledge::service::{KnowledgeService, SearchOptions};
use cairn::knowledge::types::{EntryPatch, EntryType, KnowledgeEntry, NewEntry};
use cairn::storage;

fn build_service(config: &CairnConfig) -> Result<KnowledgeService> {
    let store = storage::create_store(&config.storage)?;
    let provider = embedding::create_provider(&config.embedding)?;
    Ok(KnowledgeService::new(
        Arc::from(store),
        Arc::from(provider),
        config.retrieval.clone(),
    ))
}

fn parse_type(entry_type: Option<String>) -> Result<Option<EntryType>> {
    entry_type
        .map(|s| s.parse::<EntryType>().map_err(anyhow::Error::msg))
        .transpose()
}

pub fn add(
    config: &CairnConfig,
    owner: &str,
    title: String,
    content: String,
    entry_type: Option<String>,
    tags: Vec<String>,
    source: Option<String>,
    relevance: Option<f64>,
) -> Result<()> {
    let service = build_service(config)?;
    let entry = service.create(
        owner,
        NewEntry {
            title,
            content,
            entry_type: parse_type(entry_type)?,
            tags: if tags.is_empty() { None } else { Some(tags) },
            source,
            relevance,
            metadata: None,
        },
    )?;

    println!("Stored {} [{}] {}", entry.id, entry.entry_type, entry.title);
    Ok(())
}

pub fn search(
    config: &CairnConfig,
    owner: &str,
    query: &str,
    limit: Option<usize>,
    threshold: Option<f64>,
    entry_type: Option<String>,
) -> Result<()> {
    let service = build_service(config)?;
    let options = SearchOptions {
        limit,
        threshold,
        entry_type: parse_type(entry_type)?,
    };
    let response = service.search(owner, query, &options)?;

    if response.results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!(
        "Showing {} of {} match(es)\n",
        response.results.len(),
        response.total_matched
    );
    for (i, hit) in response.results.iter().enumerate() {
        println!(
            "  {}. [{}] {} (similarity: {:.4}, relevance: {:.2})",
            i + 1,
            hit.entry.entry_type,
            hit.entry.title,
            hit.similarity,
            hit.entry.relevance,
        );
        println!("     {}  {}", hit.entry.id, preview(&hit.entry.content, 100));
        println!();
    }

    Ok(())
}

pub fn show(config: &CairnConfig, owner: &str, id: &str) -> Result<()> {
    let service = build_service(config)?;
    let entry = service.get(owner, id)?;
    print_entry(&entry);
    Ok(())
}

pub fn edit(
    config: &CairnConfig,
    owner: &str,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    entry_type: Option<String>,
    tags: Vec<String>,
    source: Option<String>,
    relevance: Option<f64>,
) -> Result<()> {
    let service = build_service(config)?;
    let entry = service.update(
        owner,
        id,
        EntryPatch {
            title,
            content,
            entry_type: parse_type(entry_type)?,
            tags: if tags.is_empty() { None } else { Some(tags) },
            source,
            relevance,
            metadata: None,
        },
    )?;

    println!("Updated {} [{}] {}", entry.id, entry.entry_type, entry.title);
    Ok(())
}

pub fn rm(config: &CairnConfig, owner: &str, id: &str) -> Result<()> {
    let service = build_service(config)?;
    let receipt = service.delete(owner, id)?;
    println!("Deleted {} ({})", receipt.id, receipt.title);
    Ok(())
}

fn print_entry(entry: &KnowledgeEntry) {
    println!("{} [{}]", entry.id, entry.entry_type);
    println!("  title:         {}", entry.title);
    println!("  content:       {}", entry.content);
    println!("  relevance:     {:.2}", entry.relevance);
    if !entry.tags.is_empty() {
        println!("  tags:          {}", entry.tags.join(", "));
    }
    println!("  source:        {}", entry.source);
    if let Some(metadata) = &entry.metadata {
        println!("  metadata:      {metadata}");
    }
    println!("  last accessed: {}", entry.last_accessed.to_rfc3339());
    println!("  created:       {}", entry.created_at.to_rfc3339());
    println!("  updated:       {}", entry.updated_at.to_rfc3339());
}

/// Truncate content to max_chars, appending "..." if truncated.
fn preview(content: &str, max_chars: usize) -> String {
    if content.len() <= max_chars {
        content.to_string()
    } else {
        // Find a clean char boundary
        let end = content
            .char_indices()
            .take_while(|(i, _)| *i < max_chars)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(max_chars);
        format!("{}...", &content[..end])
    }
}
