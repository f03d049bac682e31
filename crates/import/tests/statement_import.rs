use ginko_core::{BankType, ImportResult, Money, TransactionType};
use ginko_import::import::{import_csv_with_schema, import_statement, ImportError};
use ginko_import::{
    detect_bank_type, detect_file_type, determine_account_category, parse_bank_csv, schema_for,
    CsvImporter, FileType, OfxParser,
};

const FIXTURE_OFX: &str = "OFXHEADER:100
DATA:OFXSGML
VERSION:102

<OFX>
<SIGNONMSGSRSV1><SONRS><STATUS><CODE>0<SEVERITY>INFO</STATUS><DTSERVER>20240201120000[+9:JST]<LANGUAGE>JPN</SONRS></SIGNONMSGSRSV1>
<BANKMSGSRSV1>
<STMTTRNRS>
<STMTRS>
<CURDEF>JPY
<BANKACCTFROM>
<BANKID>0038
<BRANCHID>101
<ACCTID>7654321
<ACCTTYPE>CHECKING
</BANKACCTFROM>
<BANKTRANLIST>
<DTSTART>20240101
<DTEND>20240131
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20240105
<TRNAMT>150000
<FITID>202401050001
<NAME>振込＊ヤマダ　タロウ
</STMTTRN>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20240110
<TRNAMT>-50000
<FITID>202401100001
<NAME>カード ｵｰﾄﾊﾞｯｸｽ
</STMTTRN>
<STMTTRN>
<TRNTYPE>DEP
<DTPOSTED>20240125
<TRNAMT>280000
<FITID>202401250001
<NAME>フリコミ カ）サトウシヨウジ（カ）
<MEMO>1月分
</STMTTRN>
</BANKTRANLIST>
<LEDGERBAL><BALAMT>1380000<DTASOF>20240131</LEDGERBAL>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>
";

const SBI_CSV: &str = "日付,内容,出金金額(円),入金金額(円),残高(円),メモ
2024/01/05,振込＊ヤマダ　タロウ,,\"150,000\",\"1,150,000\",
2024/01/10,カード ｵｰﾄﾊﾞｯｸｽ,\"50,000\",,\"1,100,000\",
2024/01/25,フリコミ カ）サトウシヨウジ（カ）,,\"280,000\",\"1,380,000\",1月分
";

fn assert_invariants(result: &ImportResult) {
    for tx in &result.transactions {
        assert_eq!(
            tx.kind == TransactionType::Deposit,
            tx.amount.is_positive(),
            "sign invariant broken for {tx:?}"
        );
    }
    let deposits: Money = result.deposits().map(|t| t.amount).sum();
    let withdrawals: Money = result
        .transactions
        .iter()
        .filter(|t| !t.is_deposit())
        .map(|t| t.amount.abs())
        .sum();
    assert_eq!(result.total_deposit_amount, deposits);
    assert_eq!(result.total_withdrawal_amount, withdrawals);
    assert_eq!(result.total_count, result.transactions.len());
    assert_eq!(result.deposit_count + result.withdrawal_count, result.total_count);
}

// ── OFX fixture ──────────────────────────────────────────────────────────────

#[test]
fn ofx_fixture_totals() {
    let result = OfxParser::parse(FIXTURE_OFX);
    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.total_count, 3);
    assert_eq!(result.deposit_count, 2);
    assert_eq!(result.withdrawal_count, 1);
    assert_eq!(result.total_deposit_amount, Money::from_yen(430_000));
    assert_eq!(result.total_withdrawal_amount, Money::from_yen(50_000));
    let info = result.account_info.as_ref().unwrap();
    assert_eq!(info.bank_id.as_deref(), Some("0038"));
    assert_eq!(info.account_id.as_deref(), Some("7654321"));
    assert_invariants(&result);
}

#[test]
fn ofx_fixture_reference_numbers() {
    let result = OfxParser::parse(FIXTURE_OFX);
    let refs: Vec<_> = result
        .transactions
        .iter()
        .map(|t| t.reference_number.as_deref())
        .collect();
    assert_eq!(
        refs,
        vec![Some("202401050001"), Some("202401100001"), Some("202401250001")]
    );
}

// ── sniffing and dispatch ────────────────────────────────────────────────────

#[test]
fn sniffing_fixtures() {
    assert_eq!(detect_file_type(FIXTURE_OFX), FileType::Ofx);
    assert_eq!(detect_file_type(SBI_CSV), FileType::Csv);
    assert_eq!(detect_file_type("statement"), FileType::Unknown);
}

#[test]
fn import_statement_dispatches_by_format() {
    let ofx = import_statement(FIXTURE_OFX, Some("january.ofx"), None).unwrap();
    assert!(ofx.account_info.is_some());
    assert!(ofx.detected_bank.is_none());

    let csv = import_statement(SBI_CSV, Some("january.csv"), None).unwrap();
    assert_eq!(csv.detected_bank, Some(BankType::Sbi));
    assert!(csv.account_info.is_none());
    assert_eq!(csv.total_count, 3);
}

#[test]
fn import_statement_rejects_unknown_and_undetected() {
    assert_eq!(
        import_statement("hello", Some("notes.txt"), None),
        Err(ImportError::UnknownFormat)
    );
    assert_eq!(
        import_statement("Date,Desc,Out,In,Bal\n2024/01/05,A,1,,2\n", None, None),
        Err(ImportError::UndeterminedBank)
    );
}

#[test]
fn import_statement_honours_explicit_bank() {
    let csv = "Date,Desc,Out,In,Bal\n2024/01/05,A,100,,900\n";
    let result = import_statement(csv, None, Some(BankType::Mufg)).unwrap();
    assert_eq!(result.detected_bank, Some(BankType::Mufg));
    assert_eq!(result.transactions[0].amount, Money::from_yen(-100));
}

#[test]
fn import_with_explicit_schema() {
    let result = import_csv_with_schema(SBI_CSV, schema_for(BankType::Sbi));
    assert!(result.success);
    assert!(result.detected_bank.is_none());
    assert_eq!(result.total_deposit_amount, Money::from_yen(430_000));
    assert_invariants(&result);
}

#[test]
fn bank_detection() {
    assert_eq!(
        detect_bank_type("日付,内容,出金金額(円),入金金額(円),残高(円),メモ\n"),
        Some(BankType::Sbi)
    );
    assert_eq!(detect_bank_type("Posted,Payee,Amount,Balance\n"), None);
}

// ── CSV partial failure ──────────────────────────────────────────────────────

#[test]
fn one_corrupt_date_in_the_middle() {
    let mut csv = String::from("日付,摘要,お支払金額,お預かり金額,残高\n");
    for day in 1..=6 {
        if day == 4 {
            csv.push_str("2024/01/xx,ATM,1000,,5000\n");
        } else {
            csv.push_str(&format!("2024/01/{day:02},ATM,1000,,5000\n"));
        }
    }
    let result = CsvImporter::parse(&csv, schema_for(BankType::Mizuho));
    assert!(!result.success);
    assert_eq!(result.total_count, 5);
    assert_eq!(result.errors.len(), 1);
    // Header is line 1, so the fourth data row sits on line 5.
    assert!(result.errors[0].starts_with("line 5:"), "{}", result.errors[0]);
    assert_invariants(&result);
}

#[test]
fn huge_amounts_are_row_errors_not_panics() {
    let csv = "日付,内容,出金金額(円),入金金額(円),残高(円),メモ
2024/01/05,A,,79228162514264337593543950335,0,
2024/01/06,B,,79228162514264337593543950335,0,
";
    let result = parse_bank_csv(csv, Some(BankType::Sbi));
    assert!(!result.success);
    assert!(result.transactions.is_empty());
    assert_eq!(result.errors.len(), 2);

    let ofx = "<OFX>
<STMTTRN><TRNTYPE>CREDIT<DTPOSTED>20240105<TRNAMT>79228162514264337593543950335</STMTTRN>
<STMTTRN><TRNTYPE>CREDIT<DTPOSTED>20240106<TRNAMT>1</STMTTRN>
</OFX>";
    let result = OfxParser::parse(ofx);
    assert_eq!(result.total_count, 1);
    assert_eq!(result.errors.len(), 1);
    assert_invariants(&result);
}

// ── shared counterparty behaviour ────────────────────────────────────────────

#[test]
fn counterparty_matches_across_formats() {
    let csv = parse_bank_csv(SBI_CSV, None);
    let ofx = OfxParser::parse(FIXTURE_OFX);
    assert_eq!(csv.total_count, ofx.total_count);

    for (c, o) in csv.transactions.iter().zip(&ofx.transactions) {
        assert_eq!(c.content, o.content);
        assert_eq!(c.kind, o.kind);
        assert_eq!(c.amount, o.amount);
        assert_eq!(c.customer_name, o.customer_name, "content: {}", c.content);
    }
    assert_eq!(csv.transactions[0].customer_name.as_deref(), Some("ヤマダ　タロウ"));
    assert_eq!(csv.transactions[1].customer_name, None);
    assert_eq!(csv.transactions[2].customer_name.as_deref(), Some("カ）サトウシヨウジ"));
}

// ── determinism ──────────────────────────────────────────────────────────────

#[test]
fn parsing_is_idempotent() {
    let a = serde_json::to_string(&OfxParser::parse(FIXTURE_OFX)).unwrap();
    let b = serde_json::to_string(&OfxParser::parse(FIXTURE_OFX)).unwrap();
    assert_eq!(a, b);

    let a = serde_json::to_string(&parse_bank_csv(SBI_CSV, None)).unwrap();
    let b = serde_json::to_string(&parse_bank_csv(SBI_CSV, None)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn serialized_result_follows_contract() {
    let value = serde_json::to_value(OfxParser::parse(FIXTURE_OFX)).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["totalCount"], 3);
    assert_eq!(value["accountInfo"]["BANKID"], "0038");
    assert_eq!(value["transactions"][0]["type"], "deposit");
    assert_eq!(value["transactions"][0]["referenceNumber"], "202401050001");
    assert_eq!(value["transactions"][1]["amount"].as_f64(), Some(-50000.0));
}

#[test]
fn no_duplicates_in_fixture() {
    assert!(OfxParser::parse(FIXTURE_OFX).duplicate_keys().is_empty());
}

// ── classification over parsed transactions ─────────────────────────────────

#[test]
fn classify_withdrawals() {
    let result = OfxParser::parse(FIXTURE_OFX);
    let categories: Vec<&str> = result
        .transactions
        .iter()
        .filter(|t| !t.is_deposit())
        .map(|t| determine_account_category(&t.content))
        .collect();
    // Half-width katakana does not match the full-width keyword.
    assert_eq!(categories, vec!["消耗品費"]);
}
