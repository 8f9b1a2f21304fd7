use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use buffer_store::{BufferStore, LocalBufferStore};
use clap::{Parser, Subcommand};
use hermes_vfd::{EngineConfig, FileObject, HostOpenFlags, MAXADDR};

#[derive(Parser, Debug)]
#[command(name = "hermes-vfd-harness", about = "Drives the paged file engine from the command line")]
struct Args {
    /// Logical file name. With `--persistent`, also the backing file's path.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,

    /// Maintain a POSIX backing file, written back on close.
    #[arg(long)]
    persistent: bool,

    /// Page/blob size in bytes.
    #[arg(long, default_value_t = 4096)]
    page_size: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Writes bytes at an address.
    Write {
        #[arg(long)]
        addr: u64,
        /// Bytes to write, taken verbatim from the argument's UTF-8 encoding.
        #[arg(long)]
        data: String,
    },
    /// Reads a byte range and prints it as a lossy UTF-8 string.
    Read {
        #[arg(long)]
        addr: u64,
        #[arg(long)]
        size: u64,
    },
    /// Prints the file's current EOA/EOF.
    Stat,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = EngineConfig::new(args.persistent, args.page_size)
        .context("build engine configuration")?;
    let store: Arc<dyn BufferStore> = Arc::new(LocalBufferStore::new());
    let open_flags = HostOpenFlags {
        read_write: true,
        create: true,
        ..Default::default()
    };

    let path = args.file.to_str().context("file path must be valid UTF-8")?;
    let mut file = FileObject::open(path, open_flags, config, MAXADDR, store)
        .with_context(|| format!("open '{path}'"))?;

    match args.command {
        Command::Write { addr, data } => {
            file.write(addr, data.len() as u64, data.as_bytes())
                .context("write")?;
            println!("wrote {} byte(s) at {addr}", data.len());
        }
        Command::Read { addr, size } => {
            let bytes = file.read(addr, size).context("read")?;
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        Command::Stat => {
            println!("eoa={} eof={}", file.get_eoa(), file.get_eof());
        }
    }

    file.close().context("close")?;
    Ok(())
}
