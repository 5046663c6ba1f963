use briefing_domain::config::{Config, ConfigSeverity};

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("briefing-gateway doctor");
    println!("=======================\n");

    let mut all_passed = true;

    check_config_file(config_path, &mut all_passed);
    check_config_validation(config, &mut all_passed);
    check_llm_providers(config, &mut all_passed);
    check_state_dir(config, &mut all_passed);
    check_rss_artifact_dir(config, &mut all_passed);

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists { config_path.to_owned() } else { format!("{config_path} not found (using defaults)") },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues.iter().filter(|e| e.severity == ConfigSeverity::Error).count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
    } else {
        print_check(
            "Config validation",
            error_count == 0,
            format!("{} issue(s) ({} error(s))", issues.len(), error_count),
        );
        for issue in &issues {
            println!("      {issue}");
        }
        if error_count > 0 {
            *all_passed = false;
        }
    }
}

fn check_llm_providers(config: &Config, all_passed: &mut bool) {
    let count = config.llm.providers.len();
    let ok = count > 0;

    print_check(
        "LLM providers configured",
        ok,
        if ok { format!("{count} provider(s)") } else { "none configured".into() },
    );

    if !ok {
        *all_passed = false;
    }
}

/// The conversation store's state directory must exist (or be creatable)
/// and be writable — the gateway fails to boot otherwise (spec §4.8, C8).
fn check_state_dir(config: &Config, all_passed: &mut bool) {
    let ok = writable_dir(&config.sessions.state_dir);
    print_check(
        "Conversation state directory writable",
        ok,
        config.sessions.state_dir.clone(),
    );
    if !ok {
        *all_passed = false;
    }
}

/// The RSS cache artifact's parent directory must be writable for the
/// daily materialiser (C3) to write the artifact atomically.
fn check_rss_artifact_dir(config: &Config, all_passed: &mut bool) {
    let path = std::path::Path::new(&config.rss.cache.artifact_path);
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let ok = match parent {
        Some(p) => writable_dir(p.to_string_lossy().as_ref()),
        None => true,
    };
    print_check("RSS artifact directory writable", ok, config.rss.cache.artifact_path.clone());
    if !ok {
        *all_passed = false;
    }
}

fn writable_dir(path: &str) -> bool {
    if std::fs::create_dir_all(path).is_err() {
        return false;
    }
    let probe = std::path::Path::new(path).join(".briefing_doctor_probe");
    let ok = std::fs::write(&probe, b"probe").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
