//! Table and tree formatting for item listings
//!
//! One formatter for every command that prints several items (`list`,
//! `search`). Column widths follow the content, capped per column.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::core::taxonomy::Taxonomy;
use crate::core::tree::{flatten, TreeNode};
use crate::entities::Item;

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
struct ColumnDef {
    header: &'static str,
    max_width: usize,
}

const COLUMNS: [ColumnDef; 6] = [
    ColumnDef { header: "ID", max_width: 16 },
    ColumnDef { header: "TYPE", max_width: 10 },
    ColumnDef { header: "PRI", max_width: 10 },
    ColumnDef { header: "STATUS", max_width: 12 },
    ColumnDef { header: "TITLE", max_width: 50 },
    ColumnDef { header: "TAGS", max_width: 24 },
];

/// Prints items in the requested output format
pub struct ItemTable<'a> {
    taxonomy: &'a Taxonomy,
    /// Show summary line after table (e.g., "5 item(s) found")
    show_summary: bool,
}

impl<'a> ItemTable<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self {
            taxonomy,
            show_summary: true,
        }
    }

    /// Suppress the summary line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Print a flat list
    pub fn print(&self, items: &[Item], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(items).into_diagnostic()?;
                println!("{}", json);
            }
            OutputFormat::Id => {
                for item in items {
                    println!("{}", item.id);
                }
            }
            OutputFormat::Md => {
                let mut table = Builder::default();
                table.push_record(COLUMNS.iter().map(|c| title_case(c.header)));
                for item in items {
                    table.push_record(raw_cells(item).map(|c| c.replace('|', "\\|")));
                }
                println!("{}", table.build().with(Style::markdown()));
            }
            OutputFormat::Tsv | OutputFormat::Auto => self.print_tsv(items),
        }
        Ok(())
    }

    fn print_tsv(&self, items: &[Item]) {
        let rows: Vec<[String; 6]> = items.iter().map(raw_cells).collect();
        let widths = column_widths(&rows);

        let header: Vec<String> = COLUMNS
            .iter()
            .zip(&widths)
            .map(|(col, &w)| format!("{:<w$}", style(col.header).bold()))
            .collect();
        println!("{}", header.join(" ").trim_end());
        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        println!("{}", "-".repeat(total_width));

        for (item, row) in items.iter().zip(&rows) {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(idx, cell)| self.styled_cell(item, idx, cell, widths[idx]))
                .collect();
            println!("{}", cells.join(" ").trim_end());
        }

        if self.show_summary {
            println!();
            println!("{} item(s) found", style(items.len()).cyan());
        }
    }

    fn styled_cell(&self, item: &Item, column: usize, cell: &str, width: usize) -> String {
        let text = truncate_str(cell, width);
        match column {
            0 => format!("{:<width$}", style(text).cyan()),
            2 => {
                let rank = self.taxonomy.priorities.rank(&item.priority);
                let last = self.taxonomy.priorities.values().len().saturating_sub(1);
                let styled = match rank {
                    0 => style(text).red().bold(),
                    1 => style(text).yellow(),
                    r if r >= last => style(text).dim(),
                    _ => style(text),
                };
                format!("{:<width$}", styled)
            }
            3 => {
                let styled = if self.taxonomy.is_terminal(&item.status) {
                    style(text).green().dim()
                } else if item.status == self.taxonomy.statuses.default_value() {
                    style(text)
                } else {
                    style(text).yellow()
                };
                format!("{:<width$}", styled)
            }
            _ => format!("{:<width$}", text),
        }
    }

    /// Print a forest built by the tree builder
    pub fn print_tree(&self, forest: &[TreeNode], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(forest).into_diagnostic()?;
                println!("{}", json);
            }
            OutputFormat::Id => {
                for (_, node) in flatten(forest) {
                    println!("{}", node.item.id);
                }
            }
            OutputFormat::Md => {
                for (depth, node) in flatten(forest) {
                    let label = format!("`{}` {}", node.item.id, node.item.title);
                    let label = if node.matched {
                        label
                    } else {
                        format!("_{}_", label)
                    };
                    println!("{}- {}", "  ".repeat(depth), label);
                }
            }
            OutputFormat::Tsv | OutputFormat::Auto => {
                let mut lines = Vec::new();
                for (idx, node) in forest.iter().enumerate() {
                    self.tree_lines(node, "", idx + 1 == forest.len(), true, &mut lines);
                }
                for line in &lines {
                    println!("{}", line);
                }
                if self.show_summary {
                    let matched = flatten(forest).iter().filter(|(_, n)| n.matched).count();
                    println!();
                    println!("{} item(s) matched", style(matched).cyan());
                }
            }
        }
        Ok(())
    }

    fn tree_lines(
        &self,
        node: &TreeNode,
        prefix: &str,
        last: bool,
        root: bool,
        out: &mut Vec<String>,
    ) {
        let (branch, child_prefix) = if root {
            (String::new(), String::new())
        } else if last {
            (format!("{}└── ", prefix), format!("{}    ", prefix))
        } else {
            (format!("{}├── ", prefix), format!("{}│   ", prefix))
        };

        let item = &node.item;
        let label = format!("{} [{}] {}", item.id, item.status, truncate_str(&item.title, 60));
        let label = if node.matched {
            let id = style(&item.id).cyan().to_string();
            label.replacen(&item.id, &id, 1)
        } else {
            style(label).dim().to_string()
        };
        out.push(format!("{}{}", branch, label));

        for (idx, child) in node.children.iter().enumerate() {
            self.tree_lines(
                child,
                &child_prefix,
                idx + 1 == node.children.len(),
                false,
                out,
            );
        }
    }
}

/// Unstyled cell text in column order
fn raw_cells(item: &Item) -> [String; 6] {
    [
        item.id.clone(),
        item.kind.clone(),
        item.priority.clone(),
        item.status.clone(),
        item.title.clone(),
        item.tags.iter().cloned().collect::<Vec<_>>().join(","),
    ]
}

/// Width per column: the longest cell or header, capped at the column max
fn column_widths(rows: &[[String; 6]]) -> Vec<usize> {
    COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let content = rows
                .iter()
                .map(|r| r[idx].chars().count())
                .max()
                .unwrap_or(0);
            content.max(col.header.len()).min(col.max_width)
        })
        .collect()
}

fn title_case(header: &str) -> String {
    let lower = header.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str) -> Item {
        let mut item = Item::new(title);
        item.id = id.to_string();
        item.kind = "task".to_string();
        item.status = "open".to_string();
        item.priority = "medium".to_string();
        item
    }

    #[test]
    fn test_column_widths_follow_content() {
        let rows = vec![raw_cells(&item("ab12", "Short"))];
        let widths = column_widths(&rows);
        assert_eq!(widths[0], 4);
        assert_eq!(widths[3], "STATUS".len());
        assert_eq!(widths[4], "Short".len());
    }

    #[test]
    fn test_column_widths_are_capped() {
        let rows = vec![raw_cells(&item("ab12", &"x".repeat(200)))];
        assert_eq!(column_widths(&rows)[4], 50);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("STATUS"), "Status");
        assert_eq!(title_case("ID"), "Id");
    }

    #[test]
    fn test_tree_lines() {
        let taxonomy = Taxonomy::default();
        let table = ItemTable::new(&taxonomy);
        let child = TreeNode {
            item: item("c1", "child"),
            matched: true,
            children: Vec::new(),
        };
        let root = TreeNode {
            item: item("r1", "root"),
            matched: false,
            children: vec![child.clone(), child],
        };

        let mut lines = Vec::new();
        table.tree_lines(&root, "", true, true, &mut lines);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("├── "));
        assert!(lines[2].starts_with("└── "));
        assert!(console::strip_ansi_codes(&lines[2]).contains("c1 [open] child"));
    }
}
