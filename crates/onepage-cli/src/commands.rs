use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use onepage_engine::{Engine, EngineConfig, EntitySnapshot};
use onepage_ir::{ContentItem, IntermediateRepresentation, IrError};
use onepage_merge::Sourcing;
use onepage_types::FactValue;
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args, cli.format).await,
        Command::Check(args) => cmd_check(args, cli.format),
        Command::Show(args) => cmd_show(args, cli.format),
    }
}

async fn cmd_merge(args: MergeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let snapshot = EntitySnapshot::load(&args.snapshot)
        .with_context(|| format!("loading snapshot {}", args.snapshot.display()))?;
    let engine = Engine::new(config)?;
    let ir = engine.run_snapshot(&snapshot).await?;
    onepage_ir::publish(&ir, &args.out)
        .with_context(|| format!("publishing {}", args.out.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ir.metadata)?),
        OutputFormat::Text => {
            let c = &ir.metadata.counts;
            println!(
                "{} Merged {} into {}",
                "✓".green().bold(),
                ir.entity.qid.to_string().cyan(),
                args.out.display().to_string().bold()
            );
            println!("  Languages: {}", ir.metadata.languages.join(", ").yellow());
            println!(
                "  Claims: {} in {} clusters ({} contested, {} unsourced)",
                c.claims, c.clusters, c.contested, c.unsourced
            );
            println!("  Facts: {}  References: {}", c.facts, c.references);
            let skipped: Vec<String> = snapshot
                .languages()
                .into_iter()
                .filter(|l| !ir.metadata.languages.contains(l))
                .collect();
            if !skipped.is_empty() {
                println!("  {} Skipped: {}", "!".yellow().bold(), skipped.join(", "));
            }
            if c.low_confidence > 0 || c.source_pending > 0 {
                println!(
                    "  {} {} low-confidence, {} source-pending",
                    "!".yellow().bold(),
                    c.low_confidence,
                    c.source_pending
                );
            }
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ir = match onepage_ir::load(&args.ir) {
        Ok(ir) => ir,
        Err(IrError::Invariant(violation)) => {
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({ "path": args.ir.display().to_string(), "valid": false, "error": violation.to_string() })
                ),
                OutputFormat::Text => println!("{} {}: {}", "✗".red().bold(), args.ir.display(), violation),
            }
            anyhow::bail!("{} failed validation", args.ir.display());
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", args.ir.display())),
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "path": args.ir.display().to_string(),
                "valid": true,
                "sections": ir.sections.len(),
                "items": ir.content.len(),
                "references": ir.references.len(),
            })
        ),
        OutputFormat::Text => println!(
            "{} {}: {} sections, {} items, {} references",
            "✓".green().bold(),
            args.ir.display(),
            ir.sections.len(),
            ir.content.len(),
            ir.references.len()
        ),
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ir = load_for_show(&args.ir)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outline(&ir))?),
        OutputFormat::Text => {
            let label = ir.entity.label(&ir.metadata.pivot).unwrap_or_default();
            println!("{} {}", ir.entity.qid.to_string().cyan().bold(), label.bold());
            for section in &ir.sections {
                println!("\n== {} ==", section.slug.yellow().bold());
                for id in &section.items {
                    match ir.content.get(id) {
                        Some(ContentItem::Claim(claim)) => {
                            let marker = match claim.sourcing {
                                Sourcing::Sourced => "".normal(),
                                Sourcing::Unsourced => " [unsourced]".red(),
                            };
                            println!(
                                "  {} [{}] {}{}",
                                id.dimmed(),
                                claim.primary.lang.green(),
                                claim.primary.text,
                                marker
                            );
                            if args.alternates {
                                for alt in &claim.alternates {
                                    println!("      {} [{}] {}", "alt".dimmed(), alt.lang.green(), alt.text);
                                }
                            }
                        }
                        Some(ContentItem::Fact(fact)) => {
                            let sources: Vec<String> = fact
                                .sources
                                .iter()
                                .map(|s| s.wiki.clone().unwrap_or_else(|| "wikidata".into()))
                                .collect();
                            println!(
                                "  {} {} = {} {}",
                                id.dimmed(),
                                fact.property.blue(),
                                describe_value(&fact.value),
                                format!("({})", sources.join(", ")).dimmed()
                            );
                            for (q, v) in &fact.qualifiers {
                                println!("      {} = {}", q.blue(), v);
                            }
                        }
                        None => println!("  {} {}", id.red(), "missing".red()),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Show tolerates invalid files so they can be inspected; it only warns.
fn load_for_show(path: &Path) -> anyhow::Result<IntermediateRepresentation> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let ir = IntermediateRepresentation::from_json(&json)?;
    if let Err(violation) = ir.validate() {
        tracing::warn!(path = %path.display(), %violation, "IR does not validate");
    }
    Ok(ir)
}

fn describe_value(value: &FactValue) -> String {
    match value {
        FactValue::Text { value } => value.clone(),
        FactValue::Entity { qid, label: Some(label) } => format!("{label} ({qid})"),
        FactValue::Entity { qid, label: None } => qid.clone(),
        FactValue::Quantity { amount, unit: Some(unit) } => format!("{amount} {unit}"),
        FactValue::Quantity { amount, unit: None } => amount.clone(),
        FactValue::Time { value } => value.to_string(),
    }
}

fn outline(ir: &IntermediateRepresentation) -> serde_json::Value {
    let sections: Vec<serde_json::Value> = ir
        .sections
        .iter()
        .map(|section| {
            let items: Vec<serde_json::Value> = section
                .items
                .iter()
                .filter_map(|id| {
                    ir.content.get(id).map(|item| match item {
                        ContentItem::Claim(claim) => json!({
                            "id": id,
                            "type": "claim",
                            "lang": claim.primary.lang,
                            "text": claim.primary.text,
                            "alternates": claim.alternates.len(),
                            "sourcing": claim.sourcing,
                        }),
                        ContentItem::Fact(fact) => json!({
                            "id": id,
                            "type": "fact",
                            "property": fact.property,
                            "value": describe_value(&fact.value),
                            "qualifiers": fact.qualifiers,
                        }),
                    })
                })
                .collect();
            json!({ "slug": section.slug, "items": items })
        })
        .collect();
    json!({ "entity": ir.entity.qid.to_string(), "sections": sections })
}
