use steptimer_core::format::format_clock;
use steptimer_core::routine::total_seconds;
use steptimer_core::view;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = super::open_session()?;
    let engine = session.engine();
    let run_seconds = total_seconds(engine.run_steps());
    let today = session.today_total();

    if json {
        let status = serde_json::json!({
            "steps": session.steps().len(),
            "repeat": session.repeat().get(),
            "run_steps": engine.run_steps().len(),
            "run_seconds": run_seconds,
            "presets": session.presets().len(),
            "logs": session.logs().len(),
            "today": today,
            "state": engine.snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let (title, status) = view::current_step_status(engine, !session.steps().is_empty());
    println!("{title}");
    println!("  {status}");
    println!(
        "ステップ {} × {}回 = {} ({})",
        session.steps().len(),
        session.repeat(),
        engine.run_steps().len(),
        format_clock(run_seconds)
    );
    println!("{}", view::today_total_line(&today));
    Ok(())
}
