//! Canned API responses shared by unit tests.

/// Sample `periods` response for a EUR account.
pub(crate) const SAMPLE_STATEMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<AccountStatement>
  <Info>
    <accountId>2501201133</accountId>
    <bankId>8330</bankId>
    <currency>EUR</currency>
    <iban>SK2383300000002501201133</iban>
    <bic>FIOZSKBAXXX</bic>
    <openingBalance>0.00</openingBalance>
    <closingBalance>45.97</closingBalance>
    <dateStart>2017-01-01+01:00</dateStart>
    <dateEnd>2017-05-01+02:00</dateEnd>
    <idFrom>13926601410</idFrom>
    <idTo>13926601410</idTo>
  </Info>
  <TransactionList>
    <Transaction>
      <column_22 name="ID pohybu" id="22">13926601410</column_22>
      <column_0 name="Datum" id="0">2017-04-11+02:00</column_0>
      <column_1 name="Objem" id="1">45.97</column_1>
      <column_14 name="Měna" id="14">EUR</column_14>
      <column_2 name="Protiúčet" id="2">SK2183100000001100248431</column_2>
      <column_10 name="Název protiúčtu" id="10">john doe</column_10>
      <column_12 name="Název banky" id="12">ZUNO BANK AG, pobočka zahraničnej banky</column_12>
      <column_4 name="KS" id="4">0558</column_4>
      <column_7 name="Uživatelská identifikace" id="7">john doe</column_7>
      <column_16 name="Zpráva pro příjemce" id="16">/DO2017-04-10/SPPrevod zo zuno, john doe</column_16>
      <column_8 name="Typ" id="8">Bezhotovostní příjem</column_8>
      <column_9 name="Provedl" id="9">Jan Novák</column_9>
      <column_25 name="Komentář" id="25">john doe</column_25>
      <column_26 name="BIC" id="26">RIDBSKBXXXX</column_26>
      <column_17 name="ID pokynu" id="17">15689512949</column_17>
    </Transaction>
  </TransactionList>
</AccountStatement>
"#;
