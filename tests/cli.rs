use std::path::Path;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use rstest::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

/// 生成测试数据集：纯红、纯蓝和红白条纹
fn dataset(dir: &Path) -> Result<()> {
    RgbImage::from_pixel(120, 120, Rgb([220, 20, 20])).save(dir.join("red.png"))?;
    RgbImage::from_pixel(120, 120, Rgb([20, 40, 210])).save(dir.join("blue.png"))?;
    RgbImage::from_fn(120, 120, |x, _| if (x / 12) % 2 == 0 { Rgb([220, 20, 20]) } else { Rgb([245, 245, 245]) })
        .save(dir.join("stripes.png"))?;
    Ok(())
}

#[fixture]
fn workspace() -> (assert_fs::TempDir, assert_fs::TempDir) {
    let conf_dir = assert_fs::TempDir::new().unwrap();
    let images = assert_fs::TempDir::new().unwrap();
    dataset(images.path()).unwrap();
    (conf_dir, images)
}

#[rstest]
fn analyze_json(workspace: (assert_fs::TempDir, assert_fs::TempDir)) -> Result<()> {
    let (conf_dir, images) = workspace;
    cargo_run!("vismatch", "-c", conf_dir.path(), "analyze", images.path().join("red.png"))
        .success()
        .stdout(predicate::str::contains("\"dominantColors\""))
        .stdout(predicate::str::contains("#DD1111"))
        .stdout(predicate::str::contains("\"palette\""));
    Ok(())
}

#[rstest]
fn analyze_table(workspace: (assert_fs::TempDir, assert_fs::TempDir)) -> Result<()> {
    let (conf_dir, images) = workspace;
    cargo_run!(
        "vismatch",
        "-c",
        conf_dir.path(),
        "analyze",
        "--output-format",
        "table",
        images.path().join("stripes.png")
    )
    .success()
    .stdout(predicate::str::contains("orientation\thorizontal"))
    .stdout(predicate::str::contains("temperature\twarm"));
    Ok(())
}

#[test]
fn analyze_garbage() -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;
    let file = conf_dir.child("broken.png");
    file.write_binary(b"not an image")?;
    cargo_run!("vismatch", "-c", conf_dir.path(), "analyze", file.path())
        .failure()
        .stderr(predicate::str::contains("图片解码失败"));
    Ok(())
}

#[rstest]
fn add_then_search(workspace: (assert_fs::TempDir, assert_fs::TempDir)) -> Result<()> {
    let (conf_dir, images) = workspace;

    cargo_run!("vismatch", "-c", conf_dir.path(), "add", images.path())
        .success()
        .stdout(predicate::str::contains("added 3"));
    conf_dir.child("catalog.json").assert(predicate::str::contains("\"id\": \"stripes\""));

    // 图片没有变化时跳过
    cargo_run!("vismatch", "-c", conf_dir.path(), "add", images.path())
        .success()
        .stdout(predicate::str::contains("skipped 3"));

    cargo_run!("vismatch", "-c", conf_dir.path(), "add", "--overwrite", images.path())
        .success()
        .stdout(predicate::str::contains("updated 3"));

    cargo_run!("vismatch", "-c", conf_dir.path(), "search", images.path().join("red.png"))
        .success()
        .stdout(predicate::str::starts_with("1\t100\tred\t"));

    cargo_run!(
        "vismatch",
        "-c",
        conf_dir.path(),
        "search",
        "--output-format",
        "json",
        "--count",
        "1",
        images.path().join("blue.png")
    )
    .success()
    .stdout(predicate::str::contains("\"id\": \"blue\""))
    .stdout(predicate::str::contains("\"rank\": 1"))
    .stdout(predicate::str::contains("\"rank\": 2").not());

    Ok(())
}

#[rstest]
fn search_grouped(workspace: (assert_fs::TempDir, assert_fs::TempDir)) -> Result<()> {
    let (conf_dir, images) = workspace;
    cargo_run!("vismatch", "-c", conf_dir.path(), "add", images.path()).success();
    cargo_run!("vismatch", "-c", conf_dir.path(), "search", "--group", "--min-score", "0", images.path().join("red.png"))
        .success()
        .stdout(predicate::str::contains("[excellent]"))
        .stdout(predicate::str::contains("[poor]"));
    Ok(())
}

#[rstest]
fn similar(workspace: (assert_fs::TempDir, assert_fs::TempDir)) -> Result<()> {
    let (conf_dir, images) = workspace;
    cargo_run!("vismatch", "-c", conf_dir.path(), "add", images.path()).success();

    cargo_run!("vismatch", "-c", conf_dir.path(), "similar", "--output-format", "json", "red")
        .success()
        .stdout(predicate::str::contains("\"id\": \"red\"").not());

    cargo_run!("vismatch", "-c", conf_dir.path(), "similar", "missing")
        .failure()
        .stderr(predicate::str::contains("商品不存在"));
    Ok(())
}

#[rstest]
#[case::sort_by(["--sort-by", "newest"])]
#[case::min_score(["--min-score", "150"])]
#[case::count(["--count", "0"])]
fn search_rejects_bad_options(
    workspace: (assert_fs::TempDir, assert_fs::TempDir),
    #[case] args: [&str; 2],
) -> Result<()> {
    let (conf_dir, images) = workspace;
    cargo_run!("vismatch", "-c", conf_dir.path(), "search", args[0], args[1], images.path().join("red.png")).failure();
    Ok(())
}
