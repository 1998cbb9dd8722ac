use anyhow::Result;
use clap::Parser;

use crate::cli::{OutputFormat, SubCommandExtend};
use crate::config::Opts;
use crate::coords::MapPoint;
use crate::db::ImageRecord;
use crate::store::RecordStore;

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// 只显示已分配坐标的图片，并给出其在情绪地图上的像素位置
    #[arg(long)]
    pub map: bool,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for ShowCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let db = opts.conf_dir.open_db().await?;

        if self.map {
            let points = db.mapped().await?.iter().filter_map(MapPoint::from_record).collect::<Vec<_>>();
            return print_points(&points, self.output_format);
        }

        let records = db.all().await?;
        print_records(&records, self.output_format)
    }
}

fn print_records(records: &[ImageRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Table => {
            for r in records {
                let xy = match r.coordinates() {
                    Some((x, y)) => format!("({:.2}, {:.2})", x, y),
                    None => "-".to_string(),
                };
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    r.id,
                    r.mood.as_deref().unwrap_or("-"),
                    r.mood_embedding.as_ref().map_or(0, Vec::len),
                    xy,
                    r.coords_status.map_or("-", |s| s.as_str()),
                    r.image_url
                );
            }
        }
    }
    Ok(())
}

fn print_points(points: &[MapPoint], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(points)?),
        OutputFormat::Table => {
            for p in points {
                println!("{}\t{:.0}\t{:.0}\t{}", p.id, p.left, p.top, p.image_url);
            }
        }
    }
    Ok(())
}
