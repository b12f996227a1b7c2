//! Helper that `pg-embed-setup-unpriv` runs to drive an embedded cluster
//! when the test suite itself runs as root.
//!
//! Usage: `pg_worker <setup|start|stop> <payload.json>`. The payload is the
//! library's own [`WorkerPayload`], carrying the cluster settings and the
//! environment the operation needs.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Report, Result, WrapErr, bail, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Setup,
    Start,
    Stop,
}

impl Operation {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => bail!("unknown pg_worker operation '{other}'; expected setup, start or stop"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<(Operation, PathBuf)> {
    let mut args = args.into_iter().skip(1);
    let operation = args
        .next()
        .ok_or_else(|| eyre!("missing operation argument"))?;
    let operation = Operation::parse(&operation.to_string_lossy())?;
    let payload = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| eyre!("missing payload path argument"))?;
    if let Some(extra) = args.next() {
        bail!("unexpected extra argument: {}", extra.to_string_lossy());
    }
    Ok((operation, payload))
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = std::fs::read(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).wrap_err_with(|| format!("parsing {}", path.display()))
}

fn run(operation: Operation, payload: WorkerPayload) -> Result<()> {
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("rebuilding cluster settings"))?;
    for (key, value) in payload.environment {
        // SAFETY: single-threaded at this point; the runtime starts below.
        match value {
            Some(value) => unsafe { env::set_var(&key, value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("building worker runtime")?;
    let mut postgres = PostgreSQL::new(settings);
    runtime
        .block_on(async move {
            match operation {
                Operation::Setup => postgres.setup().await,
                Operation::Start => postgres.start().await,
                Operation::Stop => postgres.stop().await,
            }
        })
        .wrap_err_with(|| format!("cluster {operation} failed"))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let (operation, path) = parse_args(env::args_os())?;
    run(operation, read_payload(&path)?)
}
