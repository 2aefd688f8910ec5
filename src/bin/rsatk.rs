//! Command-line front end: loads one or more keys, runs the attack(s) the
//! caller asked for (or an unattended sweep by default), and prints the
//! recovered key and/or plaintext.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use num_bigint::BigUint;

use rsatk::bignum;
use rsatk::key::RsaWork;
use rsatk::orchestrator;

/// CTF/forensics toolkit for recovering RSA private keys and plaintexts
/// from degenerate public data.
#[derive(Parser, Debug)]
#[command(name = "rsatk", version, about)]
struct Cli {
    /// Path to a PEM/DER public or private key, or an integer-list key file.
    #[arg(long)]
    key: Option<PathBuf>,

    /// Comma-separated list of key files, for attacks that need more than
    /// one key (currently `common-factor`).
    #[arg(long, value_delimiter = ',')]
    keylist: Vec<PathBuf>,

    /// Path to a raw-bytes ciphertext file (big-endian on the wire).
    #[arg(long)]
    ciphertext: Option<PathBuf>,

    /// Comma-separated list of ciphertext files, parallel to `--keylist`.
    #[arg(long, value_delimiter = ',')]
    ctlist: Vec<PathBuf>,

    /// Newline-delimited file of primes seen in earlier CTF challenges.
    #[arg(long)]
    pastprimes: Option<PathBuf>,

    /// Leaked high bits of p and q, for `--attack apbq` (hex or decimal,
    /// pass twice: once for p, once for q).
    #[arg(long)]
    hint: Vec<String>,

    /// Local-search bound for `--attack apbq`.
    #[arg(long)]
    brute_max: Option<u64>,

    /// Run only the named attack instead of the default unattended sweep.
    /// Pass `all` to force the full unattended sweep explicitly.
    #[arg(long)]
    attack: Option<String>,

    /// Print the catalogue of attack names and exit.
    #[arg(long)]
    list: bool,

    /// Print the loaded key's public fields and exit without attacking it.
    #[arg(long)]
    dumpkey: bool,

    /// Build a public-only key from `--n`/`--e` and print it as PEM.
    #[arg(long)]
    createkey: bool,

    #[arg(long)]
    n: Option<String>,

    #[arg(long)]
    e: Option<String>,

    /// Enable debug-level logging (sets `RUST_LOG=debug` if unset).
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if cli.list {
        for name in orchestrator::list_attacks() {
            println!("{name}");
        }
        return Ok(());
    }

    if cli.createkey {
        let n = parse_required_int(cli.n.as_deref(), "--n")?;
        let e = parse_required_int(cli.e.as_deref(), "--e")?;
        let work = RsaWork::from_components(n, e);
        println!("{}", work.dump_public_pem().map_err(|e| e.to_string())?);
        return Ok(());
    }

    if !cli.keylist.is_empty() {
        return run_multi_key(&cli);
    }

    run_single_key(&cli)
}

fn run_single_key(cli: &Cli) -> Result<(), String> {
    let key_path = cli.key.as_ref().ok_or("--key is required")?;
    let mut work = load_key(key_path)?;

    if let Some(ct_path) = &cli.ciphertext {
        let bytes = std::fs::read(ct_path).map_err(|e| e.to_string())?;
        work.cipher_text = Some(bignum::from_bytes_be(&bytes));
    }
    work.past_primes_file = cli.pastprimes.clone();
    work.brute_max = cli.brute_max;
    work.verbose = cli.verbose;
    for hint in &cli.hint {
        let h = bignum::from_prefixed(hint).ok_or_else(|| format!("unparseable hint: {hint}"))?;
        work.hints.push(h);
    }

    if work.verbose {
        log::debug!(
            "loaded key n={} e={} from {}",
            work.key.public.n,
            work.key.public.e,
            key_path.display()
        );
    }

    if cli.dumpkey {
        dump_key(&work);
        return Ok(());
    }

    match cli.attack.as_deref() {
        None | Some("all") => {
            let report = orchestrator::run_unattended(&mut work);
            for (name, err) in &report.errors {
                log::warn!("{name}: {err}");
            }
            if !report.solved() {
                return Err("no attack recovered the key".into());
            }
        }
        Some(name) => {
            let solved = orchestrator::run_named(name, std::slice::from_mut(&mut work))
                .map_err(|e| e.to_string())?;
            if !solved {
                return Err("no attack recovered the key".into());
            }
        }
    }

    print_solution(&work)
}

fn run_multi_key(cli: &Cli) -> Result<(), String> {
    let mut works: Vec<RsaWork> = cli
        .keylist
        .iter()
        .map(|p| load_key(p))
        .collect::<Result<_, _>>()?;

    for (work, ct_path) in works.iter_mut().zip(cli.ctlist.iter()) {
        let bytes = std::fs::read(ct_path).map_err(|e| e.to_string())?;
        work.cipher_text = Some(bignum::from_bytes_be(&bytes));
    }

    let attack_name = cli.attack.as_deref().unwrap_or("common-factor");
    let solved = orchestrator::run_multi_key(attack_name, &mut works).map_err(|e| e.to_string())?;
    if !solved {
        return Err("no attack recovered any key".into());
    }

    for work in &works {
        if work.key.is_solved() {
            print_solution(work)?;
        }
    }
    Ok(())
}

fn load_key(path: &std::path::Path) -> Result<RsaWork, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    RsaWork::from_key_bytes(&bytes)
        .or_else(|_| RsaWork::from_integer_list(&String::from_utf8_lossy(&bytes)))
        .map_err(|e| e.to_string())
}

fn dump_key(work: &RsaWork) {
    println!("[*] n = {}", work.key.public.n);
    println!("[*] e = {}", work.key.public.e);
    if let Some(d) = &work.key.d {
        println!("[*] d = {d}");
    }
    if let Some((p, q)) = &work.key.primes {
        println!("[*] p = {p}");
        println!("[*] q = {q}");
    }
}

fn print_solution(work: &RsaWork) -> Result<(), String> {
    if work.key.is_solved() {
        println!("{}", work.dump_private_pem().map_err(|e| e.to_string())?);
    }
    if let Some(m) = work.decrypt() {
        println!("Recovered plaintext:");
        println!("{}", String::from_utf8_lossy(&bignum::to_bytes_be(&m)));
    }
    Ok(())
}

fn parse_required_int(value: Option<&str>, flag: &str) -> Result<BigUint, String> {
    let value = value.ok_or_else(|| format!("{flag} is required"))?;
    bignum::from_prefixed(value).ok_or_else(|| format!("{flag}: unparseable integer"))
}
