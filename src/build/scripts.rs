//! Generated shell scripts
//!
//! Both scripts are plain text. The bootstrap script describes how the
//! container's packages would be installed; nothing here ever runs it.

use crate::config::validator::is_shell_name;
use crate::config::ConfigModel;

/// PATH entries the entrypoint puts in front of the inherited PATH
pub const PATH_PREFIX: &str = "/workspace/venv/bin";
/// PYTHONPATH entries the entrypoint puts in front of the inherited one
pub const PYTHONPATH_PREFIX: &str = "/workspace";

pub const READY_BANNER: &str = "Continy environment ready!";

pub fn render_bootstrap(config: &ConfigModel) -> String {
    let mut script = String::from("#!/bin/bash\nset -e\n\n");

    script.push_str(&format!("# Base distribution: {}\n\n", config.base_distro));

    script.push_str("# Update package manager\napt-get update\n\n");

    script.push_str(&format!(
        "# Install basic packages\n\
         apt-get install -y python{} python3-pip python3-venv curl wget\n\n",
        config.interpreter_version
    ));

    script.push_str("# Install additional packages\n");
    for package in &config.packages {
        script.push_str(&format!("apt-get install -y {}\n", package));
    }

    script.push_str(
        "\n# Install Jupyter\n\
         pip3 install jupyter notebook jupyterlab\n\
         \n\
         # Clean up\n\
         apt-get clean\n\
         rm -rf /var/lib/apt/lists/*\n",
    );

    script
}

pub fn render_entrypoint(config: &ConfigModel) -> String {
    let mut script = String::from("#!/bin/bash\n");

    script.push_str(&format!("export PATH=\"{}:$PATH\"\n", PATH_PREFIX));
    script.push_str(&format!("export PYTHONPATH=\"{}:$PYTHONPATH\"\n", PYTHONPATH_PREFIX));

    for (key, value) in &config.environment {
        if !is_shell_name(key) {
            tracing::debug!(key = %key, "skipping environment variable");
            continue;
        }
        script.push_str(&format!("export {}=\"{}\"\n", key, escape_double_quoted(value)));
    }

    script.push_str(&format!(
        "\ncd \"{}\"\n\
         echo \"{}\"\n\
         echo \"Python virtual environment: /workspace/venv\"\n\
         echo \"To start Jupyter: jupyter notebook --ip=0.0.0.0 --allow-root\"\n\
         exec \"$@\"\n",
        escape_double_quoted(&config.working_dir),
        READY_BANNER
    ));

    script
}

/// Escape `\` and `"` so a value stays inside its double quotes.
/// `$` is left alone: values may refer to other variables.
fn escape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_lists_packages_in_order() {
        let mut config = ConfigModel::new("demo");
        config.packages = vec!["git".into(), "curl".into(), "git".into()];
        let script = render_bootstrap(&config);

        let installs: Vec<&str> = script
            .lines()
            .filter(|l| l.starts_with("apt-get install -y") && !l.contains("python"))
            .collect();
        assert_eq!(
            installs,
            vec!["apt-get install -y git", "apt-get install -y curl", "apt-get install -y git"]
        );
    }

    #[test]
    fn test_bootstrap_layout() {
        let mut config = ConfigModel::new("demo");
        config.set_interpreter_version("3.11").set_base_distro("debian:12");
        let script = render_bootstrap(&config);

        assert!(script.starts_with("#!/bin/bash\nset -e\n"));
        assert!(script.contains("debian:12"));
        let update = script.find("apt-get update").unwrap();
        let python = script.find("apt-get install -y python3.11 ").unwrap();
        let jupyter = script.find("pip3 install jupyter").unwrap();
        let clean = script.find("apt-get clean").unwrap();
        assert!(update < python && python < jupyter && jupyter < clean);
    }

    #[test]
    fn test_entrypoint_exports_in_insertion_order() {
        let mut config = ConfigModel::new("demo");
        config.set_env("ZED", "1").set_env("ALPHA", "2");
        let script = render_entrypoint(&config);

        let zed = script.find("export ZED=\"1\"").unwrap();
        let alpha = script.find("export ALPHA=\"2\"").unwrap();
        let path = script.find("export PATH=").unwrap();
        assert!(path < zed && zed < alpha);
    }

    #[test]
    fn test_entrypoint_cds_into_working_dir_and_execs() {
        let mut config = ConfigModel::new("demo");
        config.set_working_dir("/srv/app");
        let script = render_entrypoint(&config);

        assert!(script.contains("\ncd \"/srv/app\"\n"));
        assert!(script.contains(READY_BANNER));
        assert!(script.trim_end().ends_with("exec \"$@\""));
    }

    #[test]
    fn test_entrypoint_escapes_quotes() {
        let mut config = ConfigModel::new("demo");
        config.set_env("GREETING", r#"say "hi" \ bye"#).set_env("LIBS", "/opt/lib:$LIBS");
        let script = render_entrypoint(&config);

        assert!(script.contains(r#"export GREETING="say \"hi\" \\ bye""#));
        assert!(script.contains(r#"export LIBS="/opt/lib:$LIBS""#));
    }

    #[test]
    fn test_entrypoint_quotes_working_dir() {
        let mut config = ConfigModel::new("demo");
        config.set_working_dir("/my app");
        let script = render_entrypoint(&config);

        assert!(script.contains("\ncd \"/my app\"\n"));
        assert!(!script.contains("cd /my app"));
    }

    #[test]
    fn test_entrypoint_skips_invalid_env_keys() {
        let mut config = ConfigModel::new("demo");
        config.set_env("X;touch /tmp/p", "1").set_env("GOOD", "2");
        let script = render_entrypoint(&config);

        assert!(!script.contains("touch"));
        assert!(script.contains("export GOOD=\"2\""));
    }
}
