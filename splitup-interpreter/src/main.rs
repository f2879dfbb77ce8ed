mod bootstrap;

use bootstrap::{AppConfig, CliResult, init_logging};
use splitup_application::{LedgerError, LedgerProcessor, LedgerSnapshotSource, UpdatePolicy};
use splitup_domain::{
    BalanceEngine, Expense, Group, GroupId, Member, MemberId, SpendingReport, SplitCalculator,
};
use splitup_infrastructure::{JsonStoreSnapshotSource, StaticUpdateChecker};
use splitup_presentation::{LedgerPresenter, SpendingReportPresenter};
use std::{env, process};

const USAGE: &str = "Usage: splitup_interpreter <store.json> <command>\n\
    \n\
    Commands:\n  \
      ledger <group-id>        balances, suggested settlements and activity\n  \
      settle <group-id>        settle every open expense of the group\n  \
      report <member-id> [n]   spending across the member's groups\n  \
      check-update <version>   compare a build number with the remote config";

const DEFAULT_TOP_CONTRIBUTORS: usize = 5;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let [path, command, target, rest @ ..] = args.as_slice() else {
        return Err(USAGE.into());
    };

    let config = AppConfig::from_env()?;
    let store = JsonStoreSnapshotSource::from_path(path).map_err(|err| err.to_string())?;
    let engine = BalanceEngine::new(SplitCalculator::new(config.equal_split));
    let processor = LedgerProcessor::new(&store, &engine);

    match command.as_str() {
        "ledger" => {
            let view = processor
                .refresh(&GroupId::from(target.as_str()))
                .map_err(describe)?;
            print!(
                "{}",
                LedgerPresenter::render(&view, &config.currency, config.viewer.as_ref())
            );
        }
        "settle" => {
            let commit = processor
                .settle_up(&GroupId::from(target.as_str()))
                .map_err(describe)?;
            print!(
                "{}",
                LedgerPresenter::render_commit(&commit, &config.currency)
            );
        }
        "report" => {
            let top_n = match rest.first() {
                Some(value) => value
                    .parse()
                    .map_err(|_| format!("Invalid contributor count '{value}'"))?,
                None => DEFAULT_TOP_CONTRIBUTORS,
            };
            let viewer = MemberId::from(target.as_str());
            let summary = processor.member_summary(&viewer).map_err(describe)?;
            let snapshots = store.groups_of(&viewer).map_err(|err| err.to_string())?;
            let groups: Vec<Group> = snapshots.iter().map(|s| s.group.clone()).collect();
            let mut members: Vec<Member> = Vec::new();
            for member in snapshots.iter().flat_map(|s| &s.members) {
                if !members.iter().any(|known| known.id == member.id) {
                    members.push(member.clone());
                }
            }
            let expenses: Vec<Expense> = snapshots
                .into_iter()
                .flat_map(|s| s.expenses)
                .collect();

            let report = SpendingReport::build(
                &groups,
                &members,
                &expenses,
                Some(&viewer),
                top_n,
                engine.calculator(),
            );
            print!(
                "{}",
                SpendingReportPresenter::render_summary(&summary, &config.currency)
            );
            println!();
            print!(
                "{}",
                SpendingReportPresenter::render(&report, &config.currency)
            );
        }
        "check-update" => {
            let current: u32 = target
                .parse()
                .map_err(|_| format!("Invalid version '{target}'"))?;
            let checker = StaticUpdateChecker::from_store(&store);
            match UpdatePolicy::check(&checker, current).map_err(|err| err.to_string())? {
                Some(info) => {
                    println!("{}", info.title());
                    println!("{}", info.message);
                    println!("{}", info.store_url);
                }
                None => println!("Up to date"),
            }
        }
        other => return Err(format!("Unknown command '{other}'\n{USAGE}").into()),
    }

    Ok(())
}

fn describe(err: LedgerError) -> String {
    match err {
        LedgerError::SettleUp(_) => "All expenses are already settled".to_owned(),
        other => other.to_string(),
    }
}
