//! Markdown output formatting.

use std::fmt::Write;

use crate::models::{CatalogItem, RangeTable};

/// Columns listed before the summary is cut short.
const MAX_COLUMNS: usize = 20;

/// Format a range table summary as Markdown.
#[must_use]
pub fn format_range_markdown(table: &RangeTable) -> String {
    let mut output = String::new();

    match &table.provenance {
        Some(p) => {
            let name = p.common_name.as_deref().unwrap_or(&p.species_name);
            let _ = writeln!(output, "# {name} range\n");
            if p.searched_name != p.species_name {
                let _ = writeln!(
                    output,
                    "**Searched as**: {} (from \"{}\")\n",
                    p.searched_name, p.species_name
                );
            }
            let _ = writeln!(output, "**Item**: {} (`{}`)\n", p.item_title, p.item_id);
            let _ = writeln!(output, "**File**: [{}]({}) ({} bytes)\n", p.source_file, p.download_url, p.file_size);
            let _ = writeln!(output, "**Source**: {} | **Retrieved**: {}\n", p.source, p.retrieved_at.to_rfc3339());
        }
        None => output.push_str("# Species range\n\n"),
    }

    let _ = writeln!(
        output,
        "**Rows**: {} | **With geometry**: {}\n",
        table.len(),
        table.geometry_count()
    );
    let _ = writeln!(output, "**CRS**: {}\n", crs_label(&table.crs));

    if let Some(bbox) = table.bounding_box() {
        let _ = writeln!(
            output,
            "**Bounds**: {:.4}, {:.4} to {:.4}, {:.4}\n",
            bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
        );
    }

    let columns = table.columns();
    if !columns.is_empty() {
        let shown = columns.iter().take(MAX_COLUMNS).copied().collect::<Vec<_>>().join(", ");
        if columns.len() > MAX_COLUMNS {
            let _ = writeln!(output, "**Columns**: {shown}, ... ({} total)", columns.len());
        } else {
            let _ = writeln!(output, "**Columns**: {shown}");
        }
    }

    output
}

/// Format catalog search results as Markdown.
#[must_use]
pub fn format_search_markdown(query: &str, items: &[CatalogItem]) -> String {
    if items.is_empty() {
        return format!("No range maps found for \"{query}\".");
    }

    let mut output = format!("# Range maps for \"{query}\" ({} results)\n\n", items.len());

    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(output, "{}. **{}**", i + 1, item.title);
        let _ = writeln!(output, "   - ID: `{}`", item.id);
        if let Some(scientific) = item.scientific_name() {
            let _ = writeln!(output, "   - Scientific name: *{scientific}*");
        }
    }

    output
}

/// Format the source list as Markdown.
#[must_use]
pub fn format_sources_markdown(sources: &[&str]) -> String {
    let mut output = String::from("# Range sources\n\n");
    for source in sources {
        let _ = writeln!(output, "- `{source}`");
    }
    output
}

/// Shorten WKT definitions to their name.
fn crs_label(crs: &str) -> &str {
    crs.split_once('"')
        .and_then(|(_, rest)| rest.split_once('"'))
        .map_or(crs, |(name, _)| name)
}
