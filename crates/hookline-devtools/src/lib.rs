use std::fmt::Write as _;

use hookline_core::{PassStats, Renderer, Root, SlotInfo, SlotKind};
use serde::Serialize;

pub struct Hud {
    pub enabled: bool,
    observed: u64,
    pass_ms_smooth: f32,
    pub metrics: Option<Metrics>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            enabled: false,
            observed: 0,
            pass_ms_smooth: 0.0,
            metrics: None,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn observe(&mut self, stats: &PassStats) {
        self.observed += 1;
        let last_pass_ms = stats
            .last_pass
            .map(|d| d.as_secs_f32() * 1000.0)
            .unwrap_or(0.0);
        // simple EMA
        let a = 0.2;
        self.pass_ms_smooth = if self.observed == 1 {
            last_pass_ms
        } else {
            (1.0 - a) * self.pass_ms_smooth + a * last_pass_ms
        };
        self.metrics = Some(Metrics {
            label: stats.label.clone(),
            passes: stats.passes,
            slots: stats.slots,
            last_pass_ms,
        });
    }

    pub fn pass_ms_smooth(&self) -> f32 {
        self.pass_ms_smooth
    }

    pub fn line(&self) -> String {
        let Some(m) = &self.metrics else {
            return "no passes observed".to_string();
        };
        [
            m.label.clone(),
            format!("passes: {}", m.passes),
            format!("slots: {}", m.slots),
            format!("pass: {:.2} ms (avg {:.2})", m.last_pass_ms, self.pass_ms_smooth),
        ]
        .join("  |  ")
    }
}

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub label: String,
    pub passes: u64,
    pub slots: usize,
    pub last_pass_ms: f32,
}

/// One line per slot, with callables shown as `= fn()` and absent values
/// as `= none`.
pub fn slot_table(slots: &[SlotInfo]) -> String {
    let mut out = String::new();
    for slot in slots {
        let _ = write!(out, "{:>3}: {:<6}", slot.index, slot.kind);
        match slot.kind {
            SlotKind::State => {
                let _ = write!(
                    out,
                    " value: {}  setter = fn()",
                    slot.value_type.unwrap_or("?")
                );
            }
            SlotKind::Effect => {
                let _ = write!(
                    out,
                    " deps {}  cleanup {}",
                    deps_column(&slot.deps),
                    if slot.has_cleanup { "= fn()" } else { "= none" }
                );
            }
            SlotKind::Memo => {
                let value = match slot.value_type {
                    Some(_) if slot.callable => " = fn()".to_string(),
                    Some(t) => format!(": {t}"),
                    None => " = none".to_string(),
                };
                let _ = write!(out, " deps {}  value{value}", deps_column(&slot.deps));
            }
        }
        out.push('\n');
    }
    out
}

fn deps_column(deps: &Option<Vec<String>>) -> String {
    match deps {
        Some(d) => format!("[{}]", d.join(", ")),
        None => "= none".to_string(),
    }
}

#[derive(Serialize)]
struct Report<'a> {
    stats: &'a PassStats,
    slots: &'a [SlotInfo],
}

/// Stats and slots of `root` as pretty-printed JSON.
pub fn to_json<R: Renderer>(root: &Root<R>) -> serde_json::Result<String> {
    let stats = root.stats();
    let slots = root.snapshot();
    serde_json::to_string_pretty(&Report {
        stats: &stats,
        slots: &slots,
    })
}

pub struct Inspector {
    pub hud: Hud,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self { hud: Hud::new() }
    }

    /// Records the root's latest pass. When enabled, also returns (and logs)
    /// the HUD line followed by the slot table.
    pub fn frame<R: Renderer>(&mut self, root: &Root<R>) -> Option<String> {
        self.hud.observe(&root.stats());
        if !self.hud.enabled {
            return None;
        }
        let report = format!("{}\n{}", self.hud.line(), slot_table(&root.snapshot()));
        log::debug!("{report}");
        Some(report)
    }
}
