//! Profile command - the health questionnaire.

use clap::{Args, Subcommand};
use console::style;

use healthnav_core::models::profile::{
    self, toggle, toggle_exclusive, ACTIVITY_LEVELS, AGE_GROUPS, CHECKUP_FREQUENCIES, CONDITIONS,
    DIETS, FAMILY_HISTORY, GENDERS, GOALS, HABIT_FREQUENCIES, SLEEP_HOURS, WATER_INTAKE,
};
use healthnav_core::{ProfileStore, UserProfile};

use super::Context;

/// Arguments for the profile command.
#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    command: ProfileCommand,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show the saved profile
    Show,

    /// Update questionnaire answers and save the profile
    Set(SetArgs),

    /// List the allowed answers for each question
    Options,
}

/// Questionnaire answers; anything not given keeps its saved value.
#[derive(Args, Default)]
struct SetArgs {
    #[arg(long)]
    full_name: Option<String>,

    #[arg(long)]
    age_group: Option<String>,

    #[arg(long)]
    gender: Option<String>,

    /// Height in cm
    #[arg(long)]
    height: Option<String>,

    /// Weight in kg
    #[arg(long)]
    weight: Option<String>,

    #[arg(long)]
    activity_level: Option<String>,

    #[arg(long)]
    diet: Option<String>,

    /// Glasses of water per day
    #[arg(long)]
    water_intake: Option<String>,

    #[arg(long)]
    smoke: Option<String>,

    #[arg(long)]
    alcohol: Option<String>,

    #[arg(long)]
    sleep_hours: Option<String>,

    #[arg(long)]
    medications: Option<String>,

    #[arg(long)]
    checkup_frequency: Option<String>,

    /// Add a condition ("None" clears the others)
    #[arg(long = "condition")]
    add_conditions: Vec<String>,

    /// Remove a condition
    #[arg(long = "no-condition")]
    remove_conditions: Vec<String>,

    /// Add a family history entry ("None" clears the others)
    #[arg(long = "family-history")]
    add_family_history: Vec<String>,

    /// Remove a family history entry
    #[arg(long = "no-family-history")]
    remove_family_history: Vec<String>,

    /// Add a health goal
    #[arg(long = "goal")]
    add_goals: Vec<String>,

    /// Remove a health goal
    #[arg(long = "no-goal")]
    remove_goals: Vec<String>,

    /// Consent to storing the answers
    #[arg(long)]
    consent: bool,
}

pub fn run(args: ProfileArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        ProfileCommand::Show => show_profile(ctx),
        ProfileCommand::Set(set_args) => set_profile(set_args, ctx),
        ProfileCommand::Options => {
            print!("{}", format_options());
            Ok(())
        }
    }
}

fn show_profile(ctx: &Context) -> anyhow::Result<()> {
    match ctx.store().load_profile(&ctx.user)? {
        Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
        None => println!(
            "{} No profile saved for {}. Run 'healthnav profile set --consent ...' to create one.",
            style("ℹ").blue(),
            ctx.user
        ),
    }
    Ok(())
}

fn set_profile(args: SetArgs, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.store();
    let mut profile = store.load_profile(&ctx.user)?.unwrap_or_default();

    apply(&mut profile, args);
    profile.validate()?;
    store.save_profile(&ctx.user, &profile)?;

    println!("{} Profile saved for {}", style("✓").green(), ctx.user);
    Ok(())
}

fn apply(profile: &mut UserProfile, args: SetArgs) {
    let answers = [
        (&mut profile.full_name, args.full_name),
        (&mut profile.age_group, args.age_group),
        (&mut profile.gender, args.gender),
        (&mut profile.height, args.height),
        (&mut profile.weight, args.weight),
        (&mut profile.activity_level, args.activity_level),
        (&mut profile.diet, args.diet),
        (&mut profile.water_intake, args.water_intake),
        (&mut profile.smoke, args.smoke),
        (&mut profile.alcohol, args.alcohol),
        (&mut profile.sleep_hours, args.sleep_hours),
        (&mut profile.medications, args.medications),
        (&mut profile.checkup_frequency, args.checkup_frequency),
    ];
    for (slot, answer) in answers {
        if let Some(answer) = answer {
            *slot = answer;
        }
    }

    for value in &args.add_conditions {
        toggle_exclusive(&mut profile.conditions, value, true);
    }
    for value in &args.remove_conditions {
        toggle_exclusive(&mut profile.conditions, value, false);
    }
    for value in &args.add_family_history {
        toggle_exclusive(&mut profile.family_history, value, true);
    }
    for value in &args.remove_family_history {
        toggle_exclusive(&mut profile.family_history, value, false);
    }
    for value in &args.add_goals {
        toggle(&mut profile.goals, value, true);
    }
    for value in &args.remove_goals {
        toggle(&mut profile.goals, value, false);
    }

    if args.consent {
        profile.consent = true;
    }
}

fn format_options() -> String {
    let questions: [(&str, &[&str]); 11] = [
        ("--age-group", AGE_GROUPS),
        ("--gender", GENDERS),
        ("--activity-level", ACTIVITY_LEVELS),
        ("--diet", DIETS),
        ("--water-intake", WATER_INTAKE),
        ("--smoke / --alcohol", HABIT_FREQUENCIES),
        ("--sleep-hours", SLEEP_HOURS),
        ("--condition", CONDITIONS),
        ("--family-history", FAMILY_HISTORY),
        ("--checkup-frequency", CHECKUP_FREQUENCIES),
        ("--goal", GOALS),
    ];

    let mut output = String::new();
    for (flag, options) in questions {
        output.push_str(flag);
        output.push('\n');
        for option in options {
            output.push_str(&format!("  \"{}\"\n", option));
        }
    }
    output.push_str(&format!(
        "\n\"{}\" in --condition or --family-history clears the other entries.\n",
        profile::NONE
    ));
    output
}
