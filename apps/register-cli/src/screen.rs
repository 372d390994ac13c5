//! Text rendering of the three register screens.
//!
//! `render` is pure so the layout can be tested without a terminal; `run`
//! redraws whenever the engine or the camera publishes something new.

use std::fmt::Write as _;

use register_core::{Money, RegisterRules, RegisterState, SessionSnapshot};
use register_engine::ScanStatus;
use tokio::sync::watch;

const RULE: &str = "────────────────────────────────────────";

/// Formats an amount the way the price tags do: `1,320円`.
fn yen_label(amount: Money) -> String {
    format!("{}円", amount.to_string().replacen('¥', "", 1))
}

/// Renders one frame for the given snapshot.
pub fn render(snapshot: &SessionSnapshot, rules: &RegisterRules, camera: &ScanStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");

    match snapshot.state {
        RegisterState::Idle => {
            let _ = writeln!(out, "  {}レジ", yen_label(rules.unit_price));
            let _ = writeln!(out, "  がっこう・あそび用");
            let _ = writeln!(out);
            let _ = writeln!(out, "  [start] レジをはじめる");
            let _ = writeln!(out, "  ※カメラと音をつかいます");
        }
        RegisterState::Scanning => {
            let _ = writeln!(
                out,
                "  個数 {}こ    合計 {}",
                snapshot.total_count,
                yen_label(snapshot.total_amount)
            );
            let _ = writeln!(out);
            match &snapshot.last_scanned {
                Some(code) => {
                    let _ = writeln!(out, "  いまスキャンしたもの");
                    let _ = writeln!(out, "  {}", rules.item_name);
                    let _ = writeln!(out, "  {code}");
                    let _ = writeln!(out, "  + {}", yen_label(rules.unit_price));
                }
                None => {
                    let _ = writeln!(out, "  バーコードをうつしてね");
                }
            }
            if let ScanStatus::Unavailable { reason } = camera {
                let _ = writeln!(out, "  (カメラがつかえません: {reason})");
            }
            let _ = writeln!(out);
            if snapshot.can_pay {
                let _ = writeln!(out, "  [pay] お支払い");
            } else {
                let _ = writeln!(out, "  お支払い (しょうひんをスキャンしてね)");
            }
        }
        RegisterState::Payment => {
            let _ = writeln!(out, "  おかいあげ点数  {} こ", snapshot.total_count);
            let _ = writeln!(out, "  お支払い合計    {}", yen_label(snapshot.total_amount));
            let _ = writeln!(out);
            let _ = writeln!(out, "  お買い上げありがとうございます！");
            let _ = writeln!(out);
            let _ = writeln!(out, "  [reset] つぎの人（リセット）");
        }
    }

    let _ = write!(out, "{RULE}");
    out
}

/// Redraws on every published snapshot or camera status change. Ends when
/// the engine stops.
pub async fn run(
    mut snapshots: watch::Receiver<SessionSnapshot>,
    mut camera: watch::Receiver<ScanStatus>,
    rules: RegisterRules,
) {
    loop {
        let frame = {
            let snapshot = snapshots.borrow_and_update();
            let status = camera.borrow_and_update();
            render(&snapshot, &rules, &status)
        };
        println!("{frame}");

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = camera.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
