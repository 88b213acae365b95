use clap::Parser;
use std::path::PathBuf;

mod config;
pub use config::load_config;

mod io;
pub use io::*;

mod commands;
pub use commands::*;

// The top-level arguments: an optional configuration file and the subcommand to execute
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct BaseArgs {
    /// Path to a TOML file with formulation settings
    #[arg(short, long, global = true, env = "SATS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl BaseArgs {
    pub fn evaluate(self) -> anyhow::Result<()> {
        let config = load_config(self.config.as_deref())?;

        match self.command {
            Commands::Solve { io, lib } => {
                let (world, bidders) = io.instance()?;
                let result = lib.solve(&world, &bidders, &config)?;
                io.emit(|out| Ok(serde_json::to_writer_pretty(out, &result)?))?;
            }
            Commands::Export { io } => {
                let (world, bidders) = io.instance()?;
                io.emit(|out| commands::export::export(&world, &bidders, &config, out))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTANCE: &str = r#"{
        "world": { "kind": "items", "items": [0, 1] },
        "bidders": [
            { "id": 0, "archetype": "items", "base_values": { "0": 10.0, "1": 5.0 } },
            { "id": 1, "archetype": "items", "base_values": { "0": 12.0 } }
        ]
    }"#;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("satsmip-{}-{name}", std::process::id()))
    }

    #[test]
    fn solve_writes_the_allocation() {
        let input = scratch("solve.json");
        let output = scratch("solve.out.json");
        std::fs::write(&input, INSTANCE).unwrap();

        let args = BaseArgs::try_parse_from([
            "satsmip",
            "solve",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        args.evaluate().unwrap();

        let result: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();

        let total = result["total_value"].as_f64().unwrap();
        assert!((total - 17.0).abs() < 1e-4);
        assert_eq!(result["bidders"]["1"]["quantities"]["i0"], 1);
    }

    #[test]
    fn export_writes_lp_text() {
        let input = scratch("export.json");
        let output = scratch("export.lp");
        std::fs::write(&input, INSTANCE).unwrap();

        let args = BaseArgs::try_parse_from([
            "satsmip",
            "export",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        args.evaluate().unwrap();

        let lp = std::fs::read_to_string(&output).unwrap();
        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();

        assert!(lp.contains("Maximize"));
        assert!(lp.contains("Binary"));
        assert!(lp.contains("x_b1_i0"));
        assert!(lp.trim_end().ends_with("End"));
    }

    #[test]
    fn unknown_solvers_are_rejected() {
        assert!(BaseArgs::try_parse_from(["satsmip", "solve", "-", "--lib", "gurobi"]).is_err());
    }
}
