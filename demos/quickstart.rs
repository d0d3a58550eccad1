use chrono::Utc;
use leapmoment::{
    Adjustment, Field, FixedZone, InstantCodec, InstantResult, Operation, SiUnit, TimeContext,
    TimeScale, UniversalInstant,
};

fn main() -> InstantResult<()> {
    let ctx = TimeContext::global();
    let now = UniversalInstant::from_utc(Utc::now(), ctx)?;

    for scale in TimeScale::ALL {
        println!("{:<6} {}", scale.label(), now.decimal_seconds(scale, ctx)?);
    }
    println!("UTC:   {now}");
    println!("TAI:   {}", now.to_string_in(TimeScale::Tai, ctx)?);

    let leap = UniversalInstant::of(1_278_028_824, 0, TimeScale::Utc, ctx)?;
    println!("leap:  {leap} ({} bytes on the wire)", InstantCodec::to_bytes(&leap).len());

    let day_end =
        Adjustment::new(Field::DayOfMonth, Operation::Ceiling).apply(&leap, &FixedZone::UTC, ctx)?;
    println!("end of that day: {day_end}");
    println!(
        "SI seconds from leap second to now: {}",
        leap.until_si(&now, SiUnit::Seconds, ctx)?
    );
    Ok(())
}
