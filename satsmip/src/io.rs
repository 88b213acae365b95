use anyhow::Context as _;
use clap::Args;
use sats_core::models::{Bidder, World};
use sats_opt::io::Instance;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write, stdin, stdout},
    path::PathBuf,
};

/// The instance a subcommand works on and where its report goes
#[derive(Args)]
pub struct IOArgs {
    /// The instance JSON file ("-" reads stdin)
    input: PathBuf,

    /// The output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl IOArgs {
    /// Read and validate the instance
    pub fn instance(&self) -> anyhow::Result<(World, Vec<Bidder>)> {
        let instance: Instance = if self.input.as_os_str() == "-" {
            serde_json::from_reader(stdin().lock()).context("invalid instance on stdin")?
        } else {
            let file = File::open(&self.input)
                .with_context(|| format!("cannot open {}", self.input.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("invalid instance in {}", self.input.display()))?
        };
        Ok(instance.prepare()?)
    }

    /// Hand the output to `report` and flush it, so that write failures
    /// surface instead of being dropped with the buffer
    pub fn emit(
        &self,
        report: impl FnOnce(&mut dyn Write) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("cannot create {}", path.display()))?;
                let mut buffer = BufWriter::new(file);
                report(&mut buffer)?;
                buffer.flush()?;
            }
            None => {
                let mut handle = stdout().lock();
                report(&mut handle)?;
                handle.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str, output: Option<&str>) -> IOArgs {
        IOArgs {
            input: PathBuf::from(input),
            output: output.map(PathBuf::from),
        }
    }

    #[test]
    fn missing_instances_name_the_file() {
        let err = args("/nonexistent/instance.json", None)
            .instance()
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/instance.json"));
    }

    #[test]
    fn emit_writes_everything() {
        let path = std::env::temp_dir().join(format!("satsmip-emit-{}.txt", std::process::id()));
        let io = args("-", path.to_str());
        io.emit(|out| Ok(out.write_all(b"allocation")?)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "allocation");
        std::fs::remove_file(&path).unwrap();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn buffered_write_failures_are_reported() {
        // the write fits in the buffer; only the flush hits the full device
        let io = args("-", Some("/dev/full"));
        assert!(io.emit(|out| Ok(out.write_all(b"{}")?)).is_err());
    }
}
