//! Plain-text rendering of the dashboard state

use console::Style;

use taskdash_core::dashboard::{DashboardFeatures, DashboardState};
use taskdash_core::filter::TaskMetrics;
use taskdash_core::preferences::{Theme, ViewMode};
use taskdash_core::task::{Task, TaskPriority};

const GRID_COLUMNS: usize = 3;
const GRID_CELL_WIDTH: usize = 28;

/// Colors for the current theme
pub struct Palette {
    /// When false every helper returns its input unstyled
    enabled: bool,
    theme: Theme,
}

impl Palette {
    pub fn new(theme: Theme) -> Self {
        Self {
            enabled: console::colors_enabled(),
            theme,
        }
    }

    pub fn plain() -> Self {
        Self {
            enabled: false,
            theme: Theme::Light,
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn accent(&self, text: &str) -> String {
        let style = match self.theme {
            Theme::Light => Style::new().blue().bold(),
            Theme::Dark => Style::new().cyan().bright().bold(),
        };
        self.paint(text, style)
    }

    fn done(&self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    fn muted(&self, text: &str) -> String {
        self.paint(text, Style::new().dim())
    }

    fn priority(&self, priority: TaskPriority) -> String {
        let style = match priority {
            TaskPriority::High => Style::new().red(),
            TaskPriority::Medium => Style::new().yellow(),
            TaskPriority::Low => Style::new().green(),
        };
        self.paint(priority.as_str(), style)
    }
}

pub fn render_header(state: &DashboardState, palette: &Palette) -> String {
    let mut out = palette.accent("My Tasks");
    if let Some(greeting) = state.greeting() {
        out.push_str("  ");
        out.push_str(&palette.muted(&greeting));
    }
    out
}

pub fn render_stats(metrics: &TaskMetrics, features: &DashboardFeatures, palette: &Palette) -> String {
    let mut out = format!(
        "Total: {}  Pending: {}  Completed: {}  Progress: {}%",
        metrics.total,
        metrics.pending,
        palette.done(&metrics.completed.to_string()),
        metrics.completion_rate
    );
    if features.priorities {
        out.push_str(&format!("  High priority: {}", metrics.high_priority_pending));
    }
    out
}

pub fn render_tasks(state: &DashboardState, palette: &Palette) -> String {
    if state.tasks.is_empty() {
        return "No tasks yet! Add your first one with `taskdash add`.".to_string();
    }

    let visible = state.visible_tasks();
    if visible.is_empty() {
        return "No tasks match the current filter.".to_string();
    }

    match state.preferences.view_mode {
        ViewMode::List => render_list(&visible, &state.features, palette),
        ViewMode::Grid => render_grid(&visible, &state.features),
    }
}

fn checkbox(task: &Task) -> &'static str {
    if task.completed {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_list(tasks: &[&Task], features: &DashboardFeatures, palette: &Palette) -> String {
    let mut lines = Vec::new();
    for task in tasks {
        let title = if task.completed {
            palette.done(&task.title)
        } else {
            task.title.clone()
        };
        let mut line = format!("{} #{:<4} {}", checkbox(task), task.id, title);
        if features.priorities {
            line.push_str(&format!("  ({})", palette.priority(task.priority)));
        }
        let created = task.created_label();
        if !created.is_empty() {
            line.push_str(&format!("  {}", palette.muted(&created)));
        }
        lines.push(line);

        if !task.description.is_empty() {
            lines.push(format!("         {}", palette.muted(&task.description)));
        }
    }
    lines.join("\n")
}

fn render_grid(tasks: &[&Task], features: &DashboardFeatures) -> String {
    let cells: Vec<String> = tasks
        .iter()
        .map(|task| {
            let mut cell = format!("{} #{} {}", checkbox(task), task.id, task.title);
            if features.priorities && task.priority == TaskPriority::High {
                cell.push_str(" !");
            }
            fit(&cell, GRID_CELL_WIDTH)
        })
        .collect();

    cells
        .chunks(GRID_COLUMNS)
        .map(|row| row.join(" | ").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pad or truncate to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else {
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdash_core::dashboard::Variant;
    use taskdash_core::filter::{StatusFilter, ViewFilter};
    use taskdash_core::session::{Session, UserProfile};

    fn state(variant: Variant) -> DashboardState {
        DashboardState {
            session: Some(Session::new("t", Some(UserProfile::new("ana")))),
            tasks: vec![
                Task::new(1, "Buy milk")
                    .with_description("2 litres")
                    .with_priority(TaskPriority::High)
                    .with_created_at("2024-03-05T10:15:00"),
                Task::new(2, "Pay rent").with_completed(true),
            ],
            features: DashboardFeatures::for_variant(variant),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_includes_greeting() {
        let out = render_header(&state(Variant::Priority), &Palette::plain());
        assert_eq!(out, "My Tasks  Welcome back, ana!");
    }

    #[test]
    fn test_list_rendering() {
        let out = render_tasks(&state(Variant::Priority), &Palette::plain());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[ ] #1    Buy milk  (high)  Mar 5, 2024");
        assert_eq!(lines[1], "         2 litres");
        assert_eq!(lines[2], "[x] #2    Pay rent  (medium)");
    }

    #[test]
    fn test_list_without_priorities() {
        let out = render_tasks(&state(Variant::Classic), &Palette::plain());
        assert!(out.starts_with("[ ] #1    Buy milk  Mar 5, 2024"));
        assert!(!out.contains("(high)"));
    }

    #[test]
    fn test_grid_rendering() {
        let mut state = state(Variant::Priority);
        state.preferences.view_mode = ViewMode::Grid;

        let out = render_tasks(&state, &Palette::plain());
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("[ ] #1 Buy milk !"));
        assert!(out.contains(" | [x] #2 Pay rent"));
    }

    #[test]
    fn test_empty_states() {
        let mut state = state(Variant::Priority);
        state.filter = ViewFilter::new(StatusFilter::Pending, "rent");
        assert_eq!(
            render_tasks(&state, &Palette::plain()),
            "No tasks match the current filter."
        );

        state.tasks.clear();
        assert!(render_tasks(&state, &Palette::plain()).starts_with("No tasks yet!"));
    }

    #[test]
    fn test_stats() {
        let state = state(Variant::Priority);
        let out = render_stats(&state.metrics(), &state.features, &Palette::plain());
        assert_eq!(
            out,
            "Total: 2  Pending: 1  Completed: 1  Progress: 50%  High priority: 1"
        );

        let out = render_stats(
            &state.metrics(),
            &DashboardFeatures::for_variant(Variant::Classic),
            &Palette::plain(),
        );
        assert!(!out.contains("High priority"));
    }

    #[test]
    fn test_plain_palette_leaves_text_unstyled() {
        let palette = Palette::plain();
        assert_eq!(palette.accent("My Tasks"), "My Tasks");
        assert_eq!(palette.priority(TaskPriority::High), "high");
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
    }
}
