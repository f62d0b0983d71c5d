use std::{
	fs,
	io::{self, Read, Write},
	path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use resdoc::Resource;

#[derive(Parser)]
#[command(version, author = "Lach", about = "Inspect and rewrite resource manifests")]
struct Opts {
	/// Overrides RUST_LOG
	#[arg(long, global = true)]
	log_level: Option<log::LevelFilter>,
	#[command(subcommand)]
	sub: SubCommand,
}

#[derive(Args)]
struct InputOpts {
	/// Manifest files, stdin is read when none given or for `-`
	files: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum SubCommand {
	/// Print one line summary for every resource
	Describe(InputOpts),
	/// Print value at path (i.e `.metadata.labels`) for every resource
	Get {
		path: fieldpath::PathBuf,
		#[command(flatten)]
		input: InputOpts,
	},
	/// Rewrite namespace of every resource
	SetNamespace {
		#[arg(short, long, required_unless_present = "remove")]
		namespace: Option<String>,
		/// Remove namespace instead, making resources cluster-scoped
		#[arg(long, conflicts_with = "namespace")]
		remove: bool,
		#[command(flatten)]
		input: InputOpts,
	},
	/// Flatten lists and streams into one document per resource
	Normalize(InputOpts),
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
	if path == Path::new("-") {
		let mut out = Vec::new();
		io::stdin()
			.read_to_end(&mut out)
			.context("failed to read stdin")?;
		Ok(out)
	} else {
		fs::read(path).with_context(|| format!("failed to read {}", path.display()))
	}
}

fn load(input: &InputOpts) -> Result<Vec<Resource>> {
	let stdin = [PathBuf::from("-")];
	let files = if input.files.is_empty() {
		&stdin[..]
	} else {
		&input.files[..]
	};
	let mut out = vec![];
	for file in files {
		let data = read_input(file)?;
		let resources = resdoc::parse_stream(&data)
			.with_context(|| format!("failed to parse {}", file.display()))?;
		log::debug!("{} resources in {}", resources.len(), file.display());
		out.extend(resources);
	}
	Ok(out)
}

fn write_stream(out: &mut impl Write, resources: &[Resource]) -> Result<()> {
	for res in resources {
		let encoded = res
			.as_yaml_bytes()
			.with_context(|| format!("failed to encode {}", res))?;
		if !encoded.starts_with(b"---") {
			writeln!(out, "---")?;
		}
		out.write_all(&encoded)?;
		if !encoded.ends_with(b"\n") {
			writeln!(out)?;
		}
	}
	Ok(())
}

fn run(sub: SubCommand, out: &mut impl Write) -> Result<()> {
	match sub {
		SubCommand::Describe(input) => {
			for res in load(&input)? {
				writeln!(out, "{}", res.description())?;
			}
		}
		SubCommand::Get { path, input } => {
			let mut found = 0;
			for res in load(&input)? {
				match res.try_get(&path) {
					Ok(value) => {
						found += 1;
						let encoded = serde_yaml_with_quirks::to_string(value)?;
						writeln!(out, "# {}", res.description())?;
						writeln!(out, "{}", encoded.trim_start_matches("---\n").trim_end())?;
					}
					Err(e) => log::warn!("{}: {}", res.id(), e),
				}
			}
			if found == 0 {
				bail!("no resource has {}", path);
			}
		}
		SubCommand::SetNamespace {
			namespace,
			remove,
			input,
		} => {
			let mut resources = load(&input)?;
			for res in resources.iter_mut() {
				match &namespace {
					Some(ns) if !remove => res.set_namespace(ns.as_str()),
					_ => res.remove_namespace(),
				}
			}
			write_stream(out, &resources)?;
		}
		SubCommand::Normalize(input) => {
			write_stream(out, &load(&input)?)?;
		}
	}
	Ok(())
}

fn main() -> Result<()> {
	let opts: Opts = Opts::parse();

	let mut logger =
		env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
	if let Some(level) = opts.log_level {
		logger.filter_level(level);
	}
	logger.init();

	let stdout = io::stdout();
	let mut out = stdout.lock();
	run(opts.sub, &mut out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn manifest(contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	fn input(file: &tempfile::NamedTempFile) -> InputOpts {
		InputOpts {
			files: vec![file.path().to_owned()],
		}
	}

	const MANIFEST: &str = r#"
apiVersion: v1
kind: List
items:
- apiVersion: v1
  kind: ConfigMap
  metadata: {name: cfg, namespace: dev, labels: {app: web}}
- apiVersion: rbac.authorization.k8s.io/v1
  kind: ClusterRole
  metadata: {name: reader}
---
apiVersion: apps/v1
kind: Deployment
metadata: {generateName: web-, namespace: dev}
"#;

	fn run_to_string(sub: SubCommand) -> String {
		let mut out = Vec::new();
		run(sub, &mut out).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn describe() {
		let file = manifest(MANIFEST);
		assert_eq!(
			run_to_string(SubCommand::Describe(input(&file))),
			"configmap/cfg (v1) namespace: dev\n\
			clusterrole/reader (rbac.authorization.k8s.io/v1) cluster\n\
			deployment/web-* (apps/v1) namespace: dev\n"
		);
	}

	#[test]
	fn get() {
		let file = manifest(MANIFEST);
		let out = run_to_string(SubCommand::Get {
			path: fieldpath::PathBuf::from_str(".metadata.labels.app").unwrap(),
			input: input(&file),
		});
		assert_eq!(out, "# configmap/cfg (v1) namespace: dev\nweb\n");

		let missing = run(
			SubCommand::Get {
				path: fieldpath::PathBuf::from_str(".spec.nothing").unwrap(),
				input: input(&file),
			},
			&mut Vec::new(),
		);
		assert!(missing.is_err());
	}

	#[test]
	fn set_namespace() {
		let file = manifest(MANIFEST);
		let out = run_to_string(SubCommand::SetNamespace {
			namespace: Some("prod".to_owned()),
			remove: false,
			input: input(&file),
		});
		let resources = resdoc::parse_stream(out.as_bytes()).unwrap();
		assert_eq!(resources.len(), 3);
		assert!(resources.iter().all(|r| r.namespace() == "prod"));

		let out = run_to_string(SubCommand::SetNamespace {
			namespace: None,
			remove: true,
			input: input(&file),
		});
		let resources = resdoc::parse_stream(out.as_bytes()).unwrap();
		assert!(resources.iter().all(|r| !r.has_namespace()));
	}

	#[test]
	fn normalize_round_trips() {
		let file = manifest(MANIFEST);
		let out = run_to_string(SubCommand::Normalize(input(&file)));
		assert_eq!(
			resdoc::parse_stream(out.as_bytes()).unwrap(),
			resdoc::parse_stream(MANIFEST.as_bytes()).unwrap()
		);
	}

	#[test]
	fn set_namespace_args() {
		let opts = Opts::try_parse_from(["resdoc", "set-namespace", "-n", "prod", "a.yaml"]).unwrap();
		match opts.sub {
			SubCommand::SetNamespace {
				namespace,
				remove,
				input,
			} => {
				assert_eq!(namespace.as_deref(), Some("prod"));
				assert!(!remove);
				assert_eq!(input.files, vec![PathBuf::from("a.yaml")]);
			}
			_ => panic!("expected set-namespace"),
		}

		assert!(Opts::try_parse_from(["resdoc", "set-namespace", "--remove"]).is_ok());
		assert!(Opts::try_parse_from(["resdoc", "set-namespace", "a.yaml"]).is_err());
		assert!(
			Opts::try_parse_from(["resdoc", "set-namespace", "--namespace", "x", "--remove"]).is_err()
		);
	}

	#[test]
	fn parse_errors_name_file() {
		let file = manifest("kind: [oops");
		let err = load(&input(&file)).unwrap_err();
		assert!(format!("{:#}", err).contains("failed to parse"));
	}
}
