use std::path::Path;

use eksforge::config::ConfigWarning;
use eksforge::domain::cluster::NetworkRef;

pub fn print_config_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        match w.line {
            Some(line) => eprintln!(
                "⚠ Unknown config key '{}' in {}:{}",
                w.key,
                w.file.display(),
                line
            ),
            None => eprintln!("⚠ Unknown config key '{}' in {}", w.key, w.file.display()),
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?\n", suggestion);
        }
    }
}

/// Subnets of an imported VPC must carry the internal load-balancer role tag.
pub fn maybe_warn_existing_vpc(network: &NetworkRef, json: bool) {
    if json {
        return;
    }
    if let NetworkRef::Existing { vpc_id, subnet_ids } = network {
        eprintln!("ℹ Using existing VPC {}", vpc_id);
        eprintln!("  Private subnets must be tagged kubernetes.io/role/internal-elb=1");
        eprintln!("  for internal load balancers to be placed.");
        if subnet_ids.is_empty() {
            eprintln!("  eksctl needs the subnets to place nodes in: pass");
            eprintln!("  -c private-subnet-ids=subnet-…,subnet-… before deploying.");
        }
        eprintln!();
    }
}

pub fn print_written(out_dir: &Path, written: &[std::path::PathBuf]) {
    println!("✓ Wrote {} file(s) to {}", written.len(), out_dir.display());
    for path in written {
        let shown = path.strip_prefix(out_dir).unwrap_or(path.as_path());
        println!("  {}", shown.display());
    }
}
