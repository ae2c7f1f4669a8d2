//! 펀드 대시보드 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 쿼터 가격 피벗 테이블
//! fundview pivot data/quotas.json --sort FIA --desc
//!
//! # 누적 보유 수량 (마지막 날짜만)
//! fundview cumulative data/trades.json --latest
//!
//! # 여러 엔드포인트의 재무 지표를 출처별로 묶기
//! fundview series financials:data/fin.json growth:data/growth.json --by-source
//!
//! # 주식 합산 후 비중(%) NAV, CSV로 저장
//! fundview --format csv --output nav.csv nav data/nav.json --consolidate --percentage
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use fundview_analytics::{DuplicateDatePolicy, SortDirection};
use fundview_cli::commands::colmeia::{run_colmeia, ColmeiaConfig};
use fundview_cli::commands::cumulative::{run_cumulative, CumulativeConfig};
use fundview_cli::commands::nav::{run_nav, NavViewConfig};
use fundview_cli::commands::output::OutputFormat;
use fundview_cli::commands::pivot::{run_pivot, PivotConfig};
use fundview_cli::commands::series::{run_series, SeriesConfig, SeriesSource};
use fundview_cli::commands::CommandContext;
use fundview_core::{init_logging, AppConfig, DataType, FundviewError, LogConfig};

#[derive(Parser)]
#[command(name = "fundview")]
#[command(about = "Fund dashboard views - API 페이로드를 테이블/차트 데이터로 변환", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 출력 형식 (table, csv, json)
    #[arg(short, long, global = true, default_value = "table")]
    format: String,

    /// 출력 파일 경로 (지정하지 않으면 stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// 페이지 번호 (0 = 전체)
    #[arg(long, global = true, default_value = "0")]
    page: usize,

    /// 정렬 컬럼
    #[arg(long, global = true)]
    sort: Option<String>,

    /// 내림차순 정렬
    #[arg(long, global = true, default_value = "false")]
    desc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 쿼터/가격 피벗 테이블 (날짜 × 카테고리)
    Pivot {
        /// 관측치 페이로드 (JSON)
        input: PathBuf,

        /// 라인 차트 데이터셋 출력
        #[arg(long)]
        chart: bool,
    },

    /// 누적 보유 수량 테이블
    Cumulative {
        /// 포지션 이벤트 페이로드 (JSON)
        input: PathBuf,

        /// 마지막 날짜의 보유 수량만 출력 (트리맵 순서)
        #[arg(long)]
        latest: bool,
    },

    /// 재무 지표 시계열 그룹
    Series {
        /// 입력 파일 (`[financials|growth|metrics:]경로`)
        #[arg(required = true)]
        inputs: Vec<String>,

        /// 태그 없는 입력의 출처 (financials, growth, metrics)
        #[arg(short, long)]
        data_type: Option<String>,

        /// 중복 날짜 처리 (append, overwrite)
        #[arg(long, default_value = "append")]
        policy: String,

        /// 출처별로 분리해서 묶기
        #[arg(long)]
        by_source: bool,

        /// 날짜를 컬럼으로 펼친 테이블
        #[arg(long)]
        wide: bool,
    },

    /// NAV 구성 (비중, 주식 합산)
    Nav {
        /// (날짜, 자산, 값) 페이로드 (JSON)
        input: PathBuf,

        /// 비중(%)으로 환산
        #[arg(long)]
        percentage: bool,

        /// 설정된 주식 티커를 하나의 컬럼으로 합산
        #[arg(long)]
        consolidate: bool,

        /// 마지막 날짜의 파이 차트 데이터셋 출력
        #[arg(long)]
        pie: bool,
    },

    /// Colmeia 점수 요약 및 버전 비교
    Colmeia {
        /// 제출 기록 페이로드 (JSON)
        input: PathBuf,

        /// 회사 필터
        #[arg(long)]
        company: Option<String>,

        /// 버전 × 카테고리 점수 행렬
        #[arg(long)]
        matrix: bool,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return exit_code(&e);
        }
    };

    if let Err(e) = init_logging(LogConfig::from_settings(&config.logging).with_env_overrides()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli, config) {
        Ok(count) => {
            info!("✅ Rendered {} rows", count);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("{:#}", e);
            if library_error(&e).is_some_and(FundviewError::is_input_error) {
                eprintln!("입력 페이로드 또는 인자를 확인하세요.");
            }
            exit_code(&e)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load(path)
            .map_err(FundviewError::from)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AppConfig::from_env().map_err(FundviewError::from)?,
    };
    Ok(config)
}

fn run(cli: Cli, config: AppConfig) -> Result<usize> {
    let ctx = CommandContext {
        config,
        format: OutputFormat::parse(&cli.format)?,
        output: cli.output,
        page: cli.page,
        sort: cli.sort,
        direction: if cli.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        },
    };

    match cli.command {
        Commands::Pivot { input, chart } => run_pivot(PivotConfig { input, chart }, &ctx),

        Commands::Cumulative { input, latest } => {
            run_cumulative(CumulativeConfig { input, latest }, &ctx)
        }

        Commands::Series {
            inputs,
            data_type,
            policy,
            by_source,
            wide,
        } => {
            let default_data_type = data_type
                .map(|d| d.parse::<DataType>())
                .transpose()?;

            let policy = match policy.to_lowercase().as_str() {
                "append" => DuplicateDatePolicy::Append,
                "overwrite" => DuplicateDatePolicy::Overwrite,
                other => {
                    return Err(FundviewError::InvalidInput(format!(
                        "Invalid policy: {}. Use: append, overwrite",
                        other
                    ))
                    .into())
                }
            };

            let config = SeriesConfig {
                sources: inputs.iter().map(|s| SeriesSource::parse(s)).collect(),
                default_data_type,
                policy,
                by_source,
                wide,
            };
            run_series(config, &ctx)
        }

        Commands::Nav {
            input,
            percentage,
            consolidate,
            pie,
        } => run_nav(
            NavViewConfig {
                input,
                percentage,
                consolidate,
                pie,
            },
            &ctx,
        ),

        Commands::Colmeia {
            input,
            company,
            matrix,
        } => run_colmeia(
            ColmeiaConfig {
                input,
                company,
                matrix,
            },
            &ctx,
        ),
    }
}

fn library_error(err: &anyhow::Error) -> Option<&FundviewError> {
    err.chain().find_map(|cause| cause.downcast_ref::<FundviewError>())
}

/// 라이브러리 에러는 종류별 종료 코드, 그 외는 1.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    library_error(err)
        .map(|e| ExitCode::from(e.exit_code()))
        .unwrap_or(ExitCode::FAILURE)
}
