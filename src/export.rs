use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::report::{WeekReport, WeekReportRow};

/// Report emitters. The report itself is the structured record set; these
/// just lay it down as JSON (for the rest of the pipeline) and XLSX (for
/// eyeballing a week).

pub fn write_report_json(path: &Path, report: &WeekReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(report).context("serialize week report")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

pub fn write_report_xlsx(path: &Path, report: &WeekReport) -> Result<()> {
    let mut matchup_rows = vec![vec![
        "Matchup".to_string(),
        "Away".to_string(),
        "Home".to_string(),
        "Spread Diff (Away)".to_string(),
        "Spread Band".to_string(),
        "Total Diff (Over)".to_string(),
        "Total Band".to_string(),
        "ML Diff (Away)".to_string(),
        "ML Band".to_string(),
        "Sharp Consensus".to_string(),
        "Sharp Side".to_string(),
        "Total Consensus".to_string(),
        "Total Side".to_string(),
        "Spread Move".to_string(),
        "Total Move".to_string(),
        "Referee".to_string(),
        "Injuries".to_string(),
        "Weather".to_string(),
        "Recommendation".to_string(),
        "Result".to_string(),
    ]];
    for row in &report.rows {
        matchup_rows.push(matchup_row(row));
    }

    let quality_rows = vec![
        vec!["Table".to_string(), "Matched".to_string(), "Unmatched".to_string(), "Unknown Teams".to_string()],
        quality_row("Odds board", report.stats.odds),
        quality_row("Referee trends", report.stats.referee),
        quality_row("Injury/weather", report.stats.injury),
        vec![
            "Other".to_string(),
            format!("skipped schedule rows: {}", report.stats.skipped_schedule_rows),
            format!("unknown markets: {}", report.stats.unknown_markets),
            format!("unparsed quote fields: {}", report.stats.unparsed_quote_fields),
        ],
    ];

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matchups")?;
        write_rows(sheet, &matchup_rows)?;
        sheet.set_column_width(0, 12)?;
        sheet.set_column_width(18, 36)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("DataQuality")?;
        write_rows(sheet, &quality_rows)?;
        sheet.set_column_width(0, 18)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    Ok(())
}

fn matchup_row(row: &WeekReportRow) -> Vec<String> {
    vec![
        row.matchup.to_string(),
        row.away.clone(),
        row.home.clone(),
        opt_diff(row.spread.as_ref().and_then(|s| s.differential_away)),
        row.spread.map(|s| s.band.label().to_string()).unwrap_or_default(),
        opt_diff(row.total.as_ref().and_then(|s| s.differential_away)),
        row.total.map(|s| s.band.label().to_string()).unwrap_or_default(),
        opt_diff(row.moneyline.as_ref().and_then(|s| s.differential_away)),
        row.moneyline.map(|s| s.band.label().to_string()).unwrap_or_default(),
        yes_no(row.consensus.sharp_consensus),
        row.consensus
            .sharp_side
            .map(|s| s.label().to_string())
            .unwrap_or_default(),
        yes_no(row.consensus.total_consensus),
        row.consensus
            .total_side
            .map(|s| s.label().to_string())
            .unwrap_or_default(),
        opt_diff(row.spread_move),
        opt_diff(row.total_move),
        row.referee
            .as_ref()
            .and_then(|r| r.referee.clone())
            .unwrap_or_default(),
        row.injuries.clone().unwrap_or_default(),
        row.weather.clone().unwrap_or_default(),
        row.recommendation.map(|p| p.phrase()).unwrap_or_default(),
        row.result
            .map(|r| r.outcome.label().to_string())
            .unwrap_or_default(),
    ]
}

fn quality_row(label: &str, counts: crate::matcher::MatchCounts) -> Vec<String> {
    vec![
        label.to_string(),
        counts.matched.to_string(),
        counts.unmatched.to_string(),
        counts.unknown_team.to_string(),
    ]
}

fn opt_diff(value: Option<f64>) -> String {
    value.map(|v| format!("{v:+.1}")).unwrap_or_default()
}

fn yes_no(flag: bool) -> String {
    if flag { "yes".to_string() } else { String::new() }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
