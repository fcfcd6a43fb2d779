//! Parquet export of backtest trades and equity curves

use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::backtest::{BacktestResult, BacktestTrade, EquityPoint};

fn utc_micros() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}

/// Trade schema
pub fn trade_schema() -> Schema {
    Schema::new(vec![
        Field::new("symbol", DataType::Utf8, false),
        Field::new("entry_index", DataType::UInt64, false),
        Field::new("entry_time", utc_micros(), false),
        Field::new("entry_price", DataType::Float64, false),
        Field::new("exit_index", DataType::UInt64, false),
        Field::new("exit_time", utc_micros(), false),
        Field::new("exit_price", DataType::Float64, false),
        Field::new("direction", DataType::Utf8, false),
        Field::new("gap_pct", DataType::Float64, false),
        Field::new("pnl_pct", DataType::Float64, false),
        Field::new("position_size", DataType::Utf8, false), // Decimal as string
        Field::new("pnl", DataType::Utf8, false),
        Field::new("bars_held", DataType::UInt64, false),
        Field::new("exit_reason", DataType::Utf8, false),
    ])
}

/// Equity curve schema
pub fn equity_schema() -> Schema {
    Schema::new(vec![
        Field::new("symbol", DataType::Utf8, false),
        Field::new("bar_index", DataType::UInt64, false),
        Field::new("timestamp", utc_micros(), false),
        Field::new("capital", DataType::Utf8, false),
        Field::new("cumulative_pnl", DataType::Utf8, false),
    ])
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn strings<T: ToString>(values: impl Iterator<Item = T>) -> ArrayRef {
    let values: Vec<String> = values.map(|v| v.to_string()).collect();
    Arc::new(StringArray::from(values))
}

fn timestamps(values: impl Iterator<Item = DateTime<Utc>>) -> ArrayRef {
    let micros: Vec<i64> = values.map(|t| t.timestamp_micros()).collect();
    Arc::new(TimestampMicrosecondArray::from(micros).with_timezone("UTC"))
}

fn indices(values: impl Iterator<Item = usize>) -> ArrayRef {
    Arc::new(UInt64Array::from(values.map(|v| v as u64).collect::<Vec<_>>()))
}

fn floats(values: impl Iterator<Item = f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values.collect::<Vec<_>>()))
}

/// Files written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// `None` when the backtest produced no trades
    pub trades: Option<PathBuf>,
    pub equity: Option<PathBuf>,
}

/// Writes backtest output as Snappy-compressed Parquet files
pub struct TradeExporter {
    output_dir: PathBuf,
}

impl TradeExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// File path for a symbol, kind and run timestamp
    pub fn file_path(&self, symbol: &str, kind: &str, timestamp: DateTime<Utc>) -> PathBuf {
        let filename = format!(
            "{}_{}_{}.parquet",
            symbol.to_lowercase(),
            kind,
            timestamp.format("%Y%m%d_%H%M%S")
        );
        self.output_dir.join(filename)
    }

    /// Write trades and equity curve for one backtest run
    pub fn export(
        &self,
        symbol: &str,
        result: &BacktestResult,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<ExportPaths> {
        let mut paths = ExportPaths {
            trades: None,
            equity: None,
        };

        if !result.trades.is_empty() {
            let path = self.file_path(symbol, "trades", timestamp);
            self.write_trades(&path, symbol, &result.trades)?;
            paths.trades = Some(path);
        }
        if !result.equity_curve.is_empty() {
            let path = self.file_path(symbol, "equity", timestamp);
            self.write_equity(&path, symbol, &result.equity_curve)?;
            paths.equity = Some(path);
        }

        tracing::info!(
            symbol,
            trades = result.trades.len(),
            dir = %self.output_dir.display(),
            "Exported backtest to Parquet"
        );
        Ok(paths)
    }

    /// Write trades to a Parquet file
    pub fn write_trades(
        &self,
        path: &Path,
        symbol: &str,
        trades: &[BacktestTrade],
    ) -> anyhow::Result<()> {
        if trades.is_empty() {
            return Ok(());
        }

        self.ensure_dir()?;

        let schema = Arc::new(trade_schema());
        let columns = vec![
            strings(trades.iter().map(|_| symbol)),
            indices(trades.iter().map(|t| t.entry_index)),
            timestamps(trades.iter().map(|t| t.entry_time)),
            floats(trades.iter().map(|t| t.entry_price)),
            indices(trades.iter().map(|t| t.exit_index)),
            timestamps(trades.iter().map(|t| t.exit_time)),
            floats(trades.iter().map(|t| t.exit_price)),
            strings(trades.iter().map(|t| t.direction.as_str())),
            floats(trades.iter().map(|t| t.gap_pct)),
            floats(trades.iter().map(|t| t.pnl_pct)),
            strings(trades.iter().map(|t| t.position_size)),
            strings(trades.iter().map(|t| t.pnl)),
            indices(trades.iter().map(|t| t.bars_held)),
            strings(trades.iter().map(|t| t.exit_reason.as_str())),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;

        let mut writer = ArrowWriter::try_new(File::create(path)?, schema, Some(writer_properties()))?;
        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, count = trades.len(), "Wrote trades to Parquet");
        Ok(())
    }

    /// Write an equity curve to a Parquet file
    pub fn write_equity(
        &self,
        path: &Path,
        symbol: &str,
        points: &[EquityPoint],
    ) -> anyhow::Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        self.ensure_dir()?;

        let schema = Arc::new(equity_schema());
        let columns = vec![
            strings(points.iter().map(|_| symbol)),
            indices(points.iter().map(|p| p.bar_index)),
            timestamps(points.iter().map(|p| p.timestamp)),
            strings(points.iter().map(|p| p.capital)),
            strings(points.iter().map(|p| p.cumulative_pnl)),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;

        let mut writer = ArrowWriter::try_new(File::create(path)?, schema, Some(writer_properties()))?;
        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, count = points.len(), "Wrote equity curve to Parquet");
        Ok(())
    }
}

/// Reads an exported equity curve back
pub fn read_equity(path: &Path) -> anyhow::Result<Vec<EquityPoint>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?.build()?;
    let mut points = Vec::new();

    for batch in reader {
        let batch = batch?;

        let bar_index = batch
            .column(1)
            .as_any()
            .downcast_ref::<UInt64Array>()
            .ok_or_else(|| anyhow::anyhow!("Invalid bar_index column"))?;
        let timestamp = batch
            .column(2)
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp column"))?;
        let capital = batch
            .column(3)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| anyhow::anyhow!("Invalid capital column"))?;
        let cumulative_pnl = batch
            .column(4)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| anyhow::anyhow!("Invalid cumulative_pnl column"))?;

        for i in 0..batch.num_rows() {
            points.push(EquityPoint {
                bar_index: bar_index.value(i) as usize,
                timestamp: DateTime::from_timestamp_micros(timestamp.value(i))
                    .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?,
                capital: Decimal::from_str(capital.value(i))?,
                cumulative_pnl: Decimal::from_str(cumulative_pnl.value(i))?,
            });
        }
    }

    Ok(points)
}

/// Number of rows in a Parquet file
pub fn row_count(path: &Path) -> anyhow::Result<usize> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    Ok(builder.metadata().file_metadata().num_rows() as usize)
}
