use std::fs;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;

const PUBLIC_URL: &str = "http://localhost:8080/images/";

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            cmd.env_remove("SUPABASE_URL")
                .env_remove("SUPABASE_SERVICE_KEY")
                .env_remove("SUPABASE_BUCKET")
                .env_remove("OPENAI_API_KEY")
                .env_remove("OPENAI_BASE_URL");
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

#[test]
fn stub_search() -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;

    cargo_run!("moodsearch", "-c", conf_dir.path(), "search", "cat", "--strategy", "stub")
        .success()
        .stdout(predicate::str::contains("https://placekitten.com/400/300"));

    cargo_run!("moodsearch", "-c", conf_dir.path(), "search", "calm", "--strategy", "stub", "--output-format", "json")
        .success()
        .stdout(predicate::str::contains("https://via.placeholder.com/400x300"));

    Ok(())
}

#[test]
fn reconcile_local_dir() -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;
    let images = conf_dir.path().join("images");
    fs::create_dir_all(images.join("nested"))?;
    fs::write(images.join("a.jpg"), b"jpg")?;
    fs::write(images.join("nested").join("b.PNG"), b"png")?;
    fs::write(images.join("notes.txt"), b"txt")?;

    for _ in 0..2 {
        cargo_run!(
            "moodsearch",
            "-c",
            conf_dir.path(),
            "reconcile",
            "--local-dir",
            &images,
            "--public-url",
            PUBLIC_URL
        )
        .success();
    }

    cargo_run!("moodsearch", "-c", conf_dir.path(), "show", "--output-format", "json")
        .success()
        .stdout(predicate::str::contains("http://localhost:8080/images/a.jpg"))
        .stdout(predicate::str::contains("http://localhost:8080/images/nested/b.PNG"))
        .stdout(predicate::str::contains("notes.txt").not())
        .stdout(predicate::str::contains("\"id\": 3").not());

    // 还没有情绪标签，子串搜索没有结果
    cargo_run!("moodsearch", "-c", conf_dir.path(), "search", "happy", "--strategy", "substring")
        .success()
        .stdout(predicate::str::is_empty());

    Ok(())
}

#[test]
fn reconcile_requires_storage_config() -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;

    cargo_run!("moodsearch", "-c", conf_dir.path(), "reconcile")
        .failure()
        .stderr(predicate::str::contains("SUPABASE_URL"));

    Ok(())
}

#[test]
fn openai_key_is_required() -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;

    cargo_run!("moodsearch", "-c", conf_dir.path(), "embed")
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));

    cargo_run!("moodsearch", "-c", conf_dir.path(), "assign-xy")
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));

    // 默认使用向量搜索
    cargo_run!("moodsearch", "-c", conf_dir.path(), "search", "happy")
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));

    Ok(())
}

#[test]
fn zero_count_is_rejected() -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;

    cargo_run!("moodsearch", "-c", conf_dir.path(), "search", "cat", "--strategy", "stub", "--count", "0").failure();

    Ok(())
}
