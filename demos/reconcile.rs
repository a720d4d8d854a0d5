use ledger_reconcile_rs::{
    LedgerParser, Parser, SessionConfig, classify_entry, classify_groups, format_brl,
    group_totals, parse_statement, postings_to_csv, reconcile,
};

const LEDGER_CSV: &str = "\
Relatório Receber Recebido\n\
01/03/2024 a 31/03/2024\n\
Tipo: Todos\n\
Codigo Interno;Emissao;Vencto;Pagto;Historico;Valor;CLASSE;Nome Banco\n\
1;01/03/2024;05/03/2024;05/03/2024;Mensalidade março;150,00;MENSALIDADE INDIVIDUAL;Banco Itaú\n\
2;01/03/2024;05/03/2024;05/03/2024;Mensalidade março;150,00;MENSALIDADE INDIVIDUAL;Banco Itaú\n\
3;02/03/2024;10/03/2024;10/03/2024;Multa por atraso;12,34;JUROS E MULTA DE MORA;Banco Itaú\n\
*;;;;subtotal;312,34;;\n";

const STATEMENT_OFX: &str = "\
OFXHEADER:100\n\
DATA:OFXSGML\n\
<OFX>\n\
<STMTTRN>\n\
<TRNTYPE>CREDIT\n\
<DTPOSTED>20240305\n\
<TRNAMT>150.00\n\
<FITID>A1\n\
<NAME>Plano Sorriso\n\
</STMTTRN>\n\
<STMTTRN>\n\
<TRNTYPE>CREDIT\n\
<DTPOSTED>20240310\n\
<TRNAMT>12.34\n\
<FITID>A2\n\
</STMTTRN>\n\
</OFX>\n";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = LedgerParser::parse(LEDGER_CSV.as_bytes(), "contas.csv")?;
    println!(
        "razão: {} linhas ({} de controle removidas)",
        ledger.stats.final_rows, ledger.stats.dropped_control_rows
    );

    let statement = parse_statement(STATEMENT_OFX.as_bytes(), "extrato.ofx")?;
    println!("extrato: {} transações", statement.transactions.len());

    let result = reconcile(&ledger.entries, &statement.transactions);
    println!(
        "conciliação: {} pares, {} só no razão, {} só no banco",
        result.matched.len(),
        result.ledger_only.len(),
        result.bank_only.len()
    );

    let config = SessionConfig {
        group_by: vec!["CLASSE".to_string()],
        ..SessionConfig::default()
    };
    let entries = config.filter_entries(&ledger.entries);
    let by: Vec<&str> = config.group_by.iter().map(String::as_str).collect();
    let totals = group_totals(&entries, &by, None)?;
    for row in &totals.rows {
        println!("  {} -> {}", row.key[0], format_brl(row.total));
    }

    let mut postings: Vec<_> = entries.iter().map(classify_entry).collect();
    postings.extend(classify_groups(&totals));
    print!("{}", postings_to_csv(&postings)?);

    Ok(())
}
