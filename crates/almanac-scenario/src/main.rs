mod scenario;

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use almanac_core::PickerConfig;
use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::{info, warn};

use crate::scenario::{Outcome, Scenario};

#[derive(Parser, Debug)]
#[command(
    name = "almanac-scenario",
    about = "Replays recorded picker interactions and checks the resulting selection"
)]
struct Args {
    #[arg(long, default_value = "crates/almanac-scenario/scenarios/range_swap.json")]
    scenario: Vec<PathBuf>,

    /// Picker config applied to scenarios that carry none of their own.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the month grids each scenario ends on.
    #[arg(long)]
    print_grid: bool,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let fallback_config = match args.config.as_deref() {
        Some(path) => Some(PickerConfig::load(Some(path))?),
        None => None,
    };

    let scenarios = load_scenarios(&args.scenario, fallback_config.as_ref())?;
    if scenarios.is_empty() {
        return Err(anyhow!("no scenarios loaded"));
    }

    let mut failures = 0_usize;
    for scenario in &scenarios {
        info!(scenario = %scenario.name, "running scenario");
        let run = scenario::run(scenario)
            .with_context(|| format!("scenario {} failed to run", scenario.name))?;

        println!("Scenario: {}", scenario.name);
        print_outcome("result", &run.outcome);

        if args.print_grid {
            for grid in &run.rendered {
                println!("{grid}");
            }
        }

        match &scenario.expect {
            Some(expected) if *expected == run.outcome => {
                println!("  ok");
            }
            Some(expected) => {
                failures += 1;
                print_outcome("expected", expected);
                println!("  MISMATCH");
            }
            None => {
                warn!(scenario = %scenario.name, "scenario has no expectation; result not checked");
            }
        }
    }

    println!(
        "\n{} scenario(s), {} mismatch(es)",
        scenarios.len(),
        failures
    );
    if failures > 0 {
        return Err(anyhow!("{failures} scenario(s) did not match expectations"));
    }

    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
        .map_err(|e| anyhow!("invalid log level: {e}"))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    Ok(())
}

fn load_scenarios(
    paths: &[PathBuf],
    fallback_config: Option<&PickerConfig>,
) -> anyhow::Result<Vec<Scenario>> {
    let mut out = Vec::new();

    for path in paths {
        let mut scenario = load_scenario(path)?;
        if let Some(config) = fallback_config
            && scenario.config == PickerConfig::default()
        {
            scenario.config = config.clone();
        }
        out.push(scenario);
    }

    Ok(out)
}

fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse scenario {}", path.display()))
}

fn print_outcome(label: &str, outcome: &Outcome) {
    println!(
        "  {label:<8}: start={} end={} view_offset={}",
        outcome.start.as_deref().unwrap_or("-"),
        outcome.end.as_deref().unwrap_or("-"),
        outcome.view_offset
    );
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn fallback_config_fills_bare_scenarios() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"name": "bare", "base": "2024-03-15", "steps": []}}"#
        )
        .expect("write scenario");

        let config = PickerConfig {
            week_start: "sunday".to_string(),
            ..PickerConfig::default()
        };
        let loaded = load_scenarios(&[file.path().to_path_buf()], Some(&config))
            .expect("load scenarios");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].config, config);
    }

    #[test]
    fn unreadable_scenario_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_scenario(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn bundled_scenarios_match() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        let mut paths = fs::read_dir(&dir)
            .expect("scenario dir")
            .map(|entry| entry.expect("dir entry").path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect::<Vec<_>>();
        paths.sort();
        assert!(!paths.is_empty());

        for scenario in load_scenarios(&paths, None).expect("load bundled scenarios") {
            let run = scenario::run(&scenario).expect("scenario runs");
            assert_eq!(
                scenario.expect.as_ref(),
                Some(&run.outcome),
                "scenario {}",
                scenario.name
            );
        }
    }
}
