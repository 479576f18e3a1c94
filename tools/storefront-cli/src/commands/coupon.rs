//! Coupon administration.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use rust_decimal::Decimal;
use storefront_commerce::coupons::{Coupon, CouponBook, CouponDiscount, NewCoupon};

use super::{CouponArgs, CouponCommand};
use crate::context::Context;
use crate::output::active_badge;

/// Run the coupon command.
pub async fn run(args: CouponArgs, ctx: &Context) -> Result<()> {
    let db = ctx.open_db().await?;
    let book = CouponBook::new(db);

    match args.command {
        CouponCommand::Create {
            code,
            percent,
            amount,
        } => create_coupon(&book, &code, percent, amount, ctx).await,
        CouponCommand::List => list_coupons(&book, ctx).await,
        CouponCommand::Check { code } => check_coupon(&book, &code, ctx).await,
        CouponCommand::Activate { code } => {
            book.set_active(&code, true).await?;
            ctx.output.success(&format!("Coupon {} activated", code));
            Ok(())
        }
        CouponCommand::Deactivate { code, yes } => deactivate_coupon(&book, &code, yes, ctx).await,
    }
}

/// Pick the discount from the mutually exclusive flags.
fn discount_from_flags(percent: Option<Decimal>, amount: Option<Decimal>) -> Result<CouponDiscount> {
    let discount = match (percent, amount) {
        (Some(p), None) => CouponDiscount::Percent(p),
        (None, Some(a)) => CouponDiscount::Amount(a),
        _ => bail!("Pass exactly one of --percent or --amount"),
    };
    discount.validate()?;
    Ok(discount)
}

async fn create_coupon(
    book: &CouponBook,
    code: &str,
    percent: Option<Decimal>,
    amount: Option<Decimal>,
    ctx: &Context,
) -> Result<()> {
    let discount = discount_from_flags(percent, amount)?;
    let coupon = book
        .create(NewCoupon {
            code: code.to_string(),
            discount,
        })
        .await?;

    if ctx.output.is_json() {
        ctx.output.json(&coupon);
    } else {
        ctx.output.success(&format!(
            "Created coupon {} ({})",
            coupon.code,
            describe(&coupon)
        ));
    }
    Ok(())
}

async fn list_coupons(book: &CouponBook, ctx: &Context) -> Result<()> {
    let coupons = book.list().await?;

    if ctx.output.is_json() {
        ctx.output.json(&coupons);
        return Ok(());
    }

    ctx.output.header("Coupons");
    if coupons.is_empty() {
        ctx.output.info("No coupons yet. Create one with `storefront coupon create`.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = coupons
        .iter()
        .map(|coupon| {
            vec![
                coupon.code.clone(),
                describe(coupon),
                coupon.used_count.to_string(),
                active_badge(coupon.is_active),
            ]
        })
        .collect();
    ctx.output.table(&["CODE", "DISCOUNT", "USED", "STATUS"], &rows);
    Ok(())
}

async fn check_coupon(book: &CouponBook, code: &str, ctx: &Context) -> Result<()> {
    let check = book.check(code).await?;

    if ctx.output.is_json() {
        ctx.output.json(&check);
    } else if check.valid {
        ctx.output.success(&format!(
            "{} applies: {} {}",
            code,
            check.discount,
            check.kind.as_deref().unwrap_or_default()
        ));
    } else {
        ctx.output.warn(&format!("{} is unknown or inactive", code));
    }
    Ok(())
}

async fn deactivate_coupon(book: &CouponBook, code: &str, yes: bool, ctx: &Context) -> Result<()> {
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Deactivate coupon {}? Open carts using it will stop validating",
                code
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }

    book.set_active(code, false).await?;
    ctx.output.success(&format!("Coupon {} deactivated", code));
    Ok(())
}

fn describe(coupon: &Coupon) -> String {
    match coupon.discount {
        CouponDiscount::Percent(p) => format!("{}% off", p.normalize()),
        CouponDiscount::Amount(a) => format!("{} off", a),
    }
}

#[cfg(test)]
mod tests {
    use storefront_db::Db;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_discount_flags() -> TestResult {
        assert_eq!(
            discount_from_flags(Some(Decimal::from(10)), None)?,
            CouponDiscount::Percent(Decimal::from(10))
        );
        assert_eq!(
            discount_from_flags(None, Some(Decimal::from(25)))?,
            CouponDiscount::Amount(Decimal::from(25))
        );
        assert!(discount_from_flags(None, None).is_err());
        assert!(discount_from_flags(Some(Decimal::from(150)), None).is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_describe_and_toggle() -> TestResult {
        let db = Db::in_memory().await?;
        db.migrate().await?;
        let book = CouponBook::new(db);

        let coupon = book
            .create(NewCoupon {
                code: "WELCOME10".to_string(),
                discount: CouponDiscount::Percent(Decimal::from(10)),
            })
            .await?;
        assert_eq!(describe(&coupon), "10% off");

        book.set_active("WELCOME10", false).await?;
        assert!(!book.check("WELCOME10").await?.valid);
        assert!(book.set_active("NOPE", false).await.is_err());

        Ok(())
    }
}
